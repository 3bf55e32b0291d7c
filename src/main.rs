//! LayerFuse CLI
//!
//! Reads a job config describing the per-profile sliced G-code files and
//! the height partition, runs the fusion engine, and writes the combined
//! file. The output is written atomically: a failed run never leaves a
//! partial combined file behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use layerfuse::init_logging;
use layerfuse_engine::{alignment, FusionEngine, SectionInput, TransitionSettings};
use layerfuse_settings::JobConfig;

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let check_only = args.iter().any(|a| a == "--check");
    args.retain(|a| a != "--check");
    let config_path = match args.first() {
        Some(path) => PathBuf::from(path),
        None => {
            let path = JobConfig::default_config_path()?;
            info!("No job config given; using {}", path.display());
            path
        }
    };

    let config = JobConfig::load_from_file(&config_path)
        .with_context(|| format!("loading job config {}", config_path.display()))?;
    config.validate()?;

    let output = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => default_output_path(&config),
    };

    let combined = fuse_job(&config)?;
    if check_only {
        info!("Job config and fusion plan are valid; no output written");
        return Ok(());
    }
    write_atomic(&output, &combined)?;
    info!("Wrote combined G-code to {}", output.display());
    Ok(())
}

fn default_output_path(config: &JobConfig) -> PathBuf {
    let stem = config
        .model_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("combined");
    config.destination.join(format!("{}_fused.gcode", stem))
}

fn fuse_job(config: &JobConfig) -> anyhow::Result<String> {
    // Snap each requested transition height to a layer boundary of the
    // section that begins there, before extraction runs.
    let mut starts = Vec::with_capacity(config.sections.len());
    for (i, section) in config.sections.iter().enumerate() {
        let start = if i == 0 {
            0.0
        } else {
            alignment::ensure_aligned(section.start_height, section.layer_height)
        };
        if (start - section.start_height).abs() > 1e-6 {
            info!(
                "Aligned transition height {:.3}mm -> {:.3}mm (layer height {:.3}mm)",
                section.start_height, start, section.layer_height
            );
        }
        starts.push(start);
    }

    let mut inputs = Vec::with_capacity(config.sections.len());
    for (i, section) in config.sections.iter().enumerate() {
        let raw = std::fs::read_to_string(&section.gcode_path).with_context(|| {
            format!(
                "reading sliced G-code for profile '{}' from {}",
                section.profile,
                section.gcode_path.display()
            )
        })?;
        inputs.push(SectionInput {
            profile: section.profile.clone(),
            raw,
            height_start: starts[i],
            height_end: starts.get(i + 1).copied(),
        });
    }

    let settings = TransitionSettings {
        z_hop: config.z_hop,
        retraction_distance: config.retraction_distance,
        ..TransitionSettings::default()
    };
    let engine = FusionEngine::new(settings);
    Ok(engine.fuse(&inputs)?)
}

/// Write via a temp file in the destination directory, then rename
fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
