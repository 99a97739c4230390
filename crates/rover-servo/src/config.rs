//! JSON configuration for a servo run.

use std::fs;
use std::path::{Path, PathBuf};

use rover_servo_approach::{ActuatorConfig, ApproachParams};
use rover_servo_vision::LocalizerParams;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Every rig-specific setting in one file. Missing sections take defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServoConfig {
    #[serde(default)]
    pub localizer: LocalizerParams,
    #[serde(default)]
    pub approach: ApproachParams,
    #[serde(default)]
    pub actuators: ActuatorConfig,
    /// Write an annotated PNG per solved cycle into this directory.
    #[serde(default)]
    pub annotate_dir: Option<PathBuf>,
}

impl ServoConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_json(p),
            None => Ok(Self::default()),
        }
    }
}
