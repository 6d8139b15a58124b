//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.model.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model.name must not be empty".into(),
            ));
        }
        if self.classify.threshold < 0.0 || self.classify.threshold > 1.0 {
            return Err(ConfigError::ValidationError(
                "classify.threshold must be between 0.0 and 1.0".into(),
            ));
        }
        if self.classify.max_results == 0 {
            return Err(ConfigError::ValidationError(
                "classify.max_results must be > 0".into(),
            ));
        }
        if self.output.format != "json" && self.output.format != "jsonl" {
            return Err(ConfigError::ValidationError(
                "output.format must be \"json\" or \"jsonl\"".into(),
            ));
        }
        Ok(())
    }
}
