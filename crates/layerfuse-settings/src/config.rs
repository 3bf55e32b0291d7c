//! Job configuration
//!
//! Describes one fusion job: where the model and its per-profile sliced
//! outputs live, where the combined file goes, and the height partition.
//! Supports JSON and TOML files, selected by extension, stored anywhere or
//! under the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

/// Minimum allowed slicing timeout, seconds
pub const MIN_SLICING_TIMEOUT_SECS: u64 = 30;
/// Maximum allowed slicing timeout, seconds
pub const MAX_SLICING_TIMEOUT_SECS: u64 = 3600;
/// Default slicing timeout, seconds
pub const DEFAULT_SLICING_TIMEOUT_SECS: u64 = 300;

/// One section of the height partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSettings {
    /// Quality profile identifier
    pub profile: String,
    /// Requested transition height where this section begins (mm)
    pub start_height: f64,
    /// Layer height of this section's profile (mm)
    pub layer_height: f64,
    /// Path to the raw G-code produced by slicing the whole model under
    /// this profile
    pub gcode_path: PathBuf,
}

/// Persisted description of a fusion job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// The 3D model being printed
    pub model_path: PathBuf,
    /// Folder the combined G-code is written to
    pub destination: PathBuf,
    /// Ordered sections, by increasing start height; the first starts at 0
    pub sections: Vec<SectionSettings>,
    /// Per-invocation timeout for the external slicer, seconds
    pub slicing_timeout_secs: u64,
    /// Z-hop height used by synthesized transitions (mm)
    pub z_hop: f64,
    /// Retraction distance used by synthesized transitions (mm)
    pub retraction_distance: f64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            destination: PathBuf::new(),
            sections: Vec::new(),
            slicing_timeout_secs: DEFAULT_SLICING_TIMEOUT_SECS,
            z_hop: 0.4,
            retraction_distance: 4.5,
        }
    }
}

impl JobConfig {
    /// Load a config from a JSON or TOML file, selected by extension
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            other => Err(SettingsError::LoadError(format!(
                "Unsupported config format: {:?} ({})",
                other,
                path.display()
            ))),
        }
    }

    /// Save the config to a JSON or TOML file, selected by extension
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        let content = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(SettingsError::SaveError(format!(
                    "Unsupported config format: {:?} ({})",
                    other,
                    path.display()
                )))
            }
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default per-user config path (`<config dir>/layerfuse/job.toml`)
    pub fn default_config_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir()
            .ok_or_else(|| SettingsError::ConfigDirectory("no platform config dir".to_string()))?;
        Ok(base.join("layerfuse").join("job.toml"))
    }

    /// The slicing timeout clamped into the allowed range
    pub fn clamped_timeout(&self) -> u64 {
        self.slicing_timeout_secs
            .clamp(MIN_SLICING_TIMEOUT_SECS, MAX_SLICING_TIMEOUT_SECS)
    }

    /// Validate the job description
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.sections.is_empty() {
            return Err(SettingsError::InvalidSetting {
                key: "sections".to_string(),
                reason: "at least one section is required".to_string(),
            });
        }
        if self.sections[0].start_height.abs() > 1e-6 {
            return Err(SettingsError::InvalidSetting {
                key: "sections[0].start_height".to_string(),
                reason: format!(
                    "first section must start at 0, got {:.3}",
                    self.sections[0].start_height
                ),
            });
        }
        for (i, section) in self.sections.iter().enumerate() {
            if section.layer_height <= 0.0 {
                return Err(SettingsError::InvalidSetting {
                    key: format!("sections[{}].layer_height", i),
                    reason: format!("must be positive, got {:.3}", section.layer_height),
                });
            }
            if i > 0 && section.start_height <= self.sections[i - 1].start_height {
                return Err(SettingsError::InvalidSetting {
                    key: format!("sections[{}].start_height", i),
                    reason: "transition heights must be strictly increasing".to_string(),
                });
            }
        }
        if !(MIN_SLICING_TIMEOUT_SECS..=MAX_SLICING_TIMEOUT_SECS)
            .contains(&self.slicing_timeout_secs)
        {
            return Err(SettingsError::InvalidSetting {
                key: "slicing_timeout_secs".to_string(),
                reason: format!(
                    "must be between {} and {}, got {}",
                    MIN_SLICING_TIMEOUT_SECS, MAX_SLICING_TIMEOUT_SECS, self.slicing_timeout_secs
                ),
            });
        }
        if self.z_hop < 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "z_hop".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        if self.retraction_distance < 0.0 {
            return Err(SettingsError::InvalidSetting {
                key: "retraction_distance".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
