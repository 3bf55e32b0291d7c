//! Job config persistence and validation tests

use std::path::PathBuf;

use layerfuse_settings::{
    JobConfig, SectionSettings, SettingsError, DEFAULT_SLICING_TIMEOUT_SECS,
    MAX_SLICING_TIMEOUT_SECS, MIN_SLICING_TIMEOUT_SECS,
};

fn sample_config() -> JobConfig {
    JobConfig {
        model_path: PathBuf::from("/models/bracket.stl"),
        destination: PathBuf::from("/prints"),
        sections: vec![
            SectionSettings {
                profile: "draft".to_string(),
                start_height: 0.0,
                layer_height: 0.2,
                gcode_path: PathBuf::from("/prints/bracket_draft.gcode"),
            },
            SectionSettings {
                profile: "fine".to_string(),
                start_height: 10.0,
                layer_height: 0.1,
                gcode_path: PathBuf::from("/prints/bracket_fine.gcode"),
            },
        ],
        ..JobConfig::default()
    }
}

#[test]
fn test_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.toml");

    let config = sample_config();
    config.save_to_file(&path).unwrap();
    let loaded = JobConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded.sections.len(), 2);
    assert_eq!(loaded.sections[1].profile, "fine");
    assert!((loaded.sections[1].start_height - 10.0).abs() < 1e-9);
    assert_eq!(loaded.slicing_timeout_secs, DEFAULT_SLICING_TIMEOUT_SECS);
}

#[test]
fn test_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.json");

    let config = sample_config();
    config.save_to_file(&path).unwrap();
    let loaded = JobConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded.model_path, PathBuf::from("/models/bracket.stl"));
    assert!((loaded.z_hop - 0.4).abs() < 1e-9);
    assert!((loaded.retraction_distance - 4.5).abs() < 1e-9);
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.yaml");
    std::fs::write(&path, "sections: []").unwrap();

    assert!(matches!(
        JobConfig::load_from_file(&path),
        Err(SettingsError::LoadError(_))
    ));
    assert!(matches!(
        sample_config().save_to_file(&path),
        Err(SettingsError::SaveError(_))
    ));
}

#[test]
fn test_validate_accepts_sample() {
    sample_config().validate().unwrap();
}

#[test]
fn test_validate_requires_sections() {
    let mut config = sample_config();
    config.sections.clear();
    assert!(matches!(
        config.validate(),
        Err(SettingsError::InvalidSetting { key, .. }) if key == "sections"
    ));
}

#[test]
fn test_validate_requires_first_section_at_zero() {
    let mut config = sample_config();
    config.sections[0].start_height = 0.5;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_requires_increasing_heights() {
    let mut config = sample_config();
    config.sections[1].start_height = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_nonpositive_layer_height() {
    let mut config = sample_config();
    config.sections[1].layer_height = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_out_of_range_timeout() {
    let mut config = sample_config();
    config.slicing_timeout_secs = MIN_SLICING_TIMEOUT_SECS - 1;
    assert!(config.validate().is_err());

    config.slicing_timeout_secs = MAX_SLICING_TIMEOUT_SECS + 1;
    assert!(config.validate().is_err());

    config.slicing_timeout_secs = MAX_SLICING_TIMEOUT_SECS;
    config.validate().unwrap();
}

#[test]
fn test_timeout_clamping() {
    let mut config = sample_config();
    config.slicing_timeout_secs = 5;
    assert_eq!(config.clamped_timeout(), MIN_SLICING_TIMEOUT_SECS);

    config.slicing_timeout_secs = 100_000;
    assert_eq!(config.clamped_timeout(), MAX_SLICING_TIMEOUT_SECS);

    config.slicing_timeout_secs = 600;
    assert_eq!(config.clamped_timeout(), 600);
}
