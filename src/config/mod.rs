//! Configuration for `hotfiber.toml`.
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[log]`       | Verbose output                                   |
//! | `[refresh]`   | Reload session behaviour                         |
//! | `[scheduler]` | Reference reconciler limits                      |
//!
//! Every section is optional; missing fields take their defaults.

mod error;
mod section;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use section::{LogSection, RefreshSection, SchedulerSection};

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE: &str = "hotfiber.toml";

/// Root configuration structure representing `hotfiber.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub log: LogSection,
    pub refresh: RefreshSection,
    pub scheduler: SchedulerSection,
}

impl RefreshConfig {
    /// Read and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_str(&content)
    }

    /// Parse and validate config text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.nested_update_limit == 0 {
            return Err(ConfigError::Validation(
                "scheduler.nested_update_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
