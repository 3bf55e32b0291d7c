//! End-to-end smoke test: config on disk -> fusion -> combined stream

use std::path::PathBuf;

use layerfuse::{
    FusionEngine, JobConfig, SectionInput, SectionSettings, TransitionSettings,
};

fn sliced_stream(layer_height: f64, layers: u32) -> String {
    let mut s = String::new();
    s.push_str(&format!(";LAYER_COUNT:{}\n", layers));
    s.push_str("G28\nG92 E0\n");
    let mut e = 0.0;
    for n in 0..layers {
        let z = layer_height * (n as f64 + 1.0);
        s.push_str(&format!(";LAYER:{}\n", n));
        s.push_str(&format!("G0 F6000 X10.000 Y10.000 Z{:.3}\n", z));
        e += 1.0;
        s.push_str(&format!("G1 F1500 X20.000 Y20.000 E{:.5}\n", e));
    }
    s.push_str(";End of Gcode\nM84\n");
    s
}

#[test]
fn test_config_driven_fusion() {
    let dir = tempfile::tempdir().unwrap();
    let draft_path = dir.path().join("part_draft.gcode");
    let fine_path = dir.path().join("part_fine.gcode");
    std::fs::write(&draft_path, sliced_stream(0.2, 60)).unwrap();
    std::fs::write(&fine_path, sliced_stream(0.1, 120)).unwrap();

    let config = JobConfig {
        model_path: PathBuf::from("part.stl"),
        destination: dir.path().to_path_buf(),
        sections: vec![
            SectionSettings {
                profile: "draft".to_string(),
                start_height: 0.0,
                layer_height: 0.2,
                gcode_path: draft_path,
            },
            SectionSettings {
                profile: "fine".to_string(),
                start_height: 10.0,
                layer_height: 0.1,
                gcode_path: fine_path,
            },
        ],
        ..JobConfig::default()
    };
    let config_path = dir.path().join("job.toml");
    config.save_to_file(&config_path).unwrap();

    let config = JobConfig::load_from_file(&config_path).unwrap();
    config.validate().unwrap();

    let mut inputs = Vec::new();
    for (i, section) in config.sections.iter().enumerate() {
        inputs.push(SectionInput {
            profile: section.profile.clone(),
            raw: std::fs::read_to_string(&section.gcode_path).unwrap(),
            height_start: section.start_height,
            height_end: config.sections.get(i + 1).map(|s| s.start_height),
        });
    }

    let engine = FusionEngine::new(TransitionSettings {
        z_hop: config.z_hop,
        retraction_distance: config.retraction_distance,
        ..TransitionSettings::default()
    });
    let fused = engine.fuse(&inputs).unwrap();

    assert!(fused.contains("TRANSITION CODE START"));
    assert_eq!(fused.matches("G28").count(), 1);
    assert_eq!(fused.matches(";End of Gcode").count(), 1);
}
