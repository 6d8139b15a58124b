//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::labeling::RankOptions;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory where models are stored
    pub model_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("~/.lumen/models"),
        }
    }
}

/// Model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name; its files live under `{model_dir}/{name}`
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "nasnet".to_string(),
        }
    }
}

/// Classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Bypass all model work; every classify call returns empty
    pub disabled: bool,

    /// Minimum probability for a class to become a label candidate
    pub threshold: f32,

    /// Maximum number of labels per image after deduplication
    pub max_results: usize,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        let defaults = RankOptions::default();
        Self {
            disabled: false,
            threshold: defaults.threshold,
            max_results: defaults.max_results,
        }
    }
}

impl ClassifyConfig {
    /// The ranking options this section configures.
    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            threshold: self.threshold,
            max_results: self.max_results,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
