//! JSON config file adapter.
//!
//! Implements [`ConfigPort`] on top of a single JSON file.
//!
//! - A missing file loads as [`SystemConfig::default()`].
//! - A file that does not parse is `Corrupted`; one that parses but fails
//!   range checks is `ValidationFailed`.  Neither is silently repaired.
//! - `save` validates first and writes to a sibling temp file that is
//!   renamed into place, so a crash never leaves a half-written config.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

pub struct JsonFileConfig {
    path: PathBuf,
}

impl JsonFileConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonFileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Config: {} not found, using defaults", self.path.display());
                return Ok(SystemConfig::default());
            }
            Err(_) => return Err(ConfigError::IoError),
        };
        let config: SystemConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        info!("Config loaded from {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json =
            serde_json::to_vec_pretty(config).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|_| ConfigError::IoError)?;
        fs::rename(&tmp, &self.path).map_err(|_| ConfigError::IoError)?;
        info!("Config saved to {}", self.path.display());
        Ok(())
    }
}
