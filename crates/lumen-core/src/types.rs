//! Core data types for the Lumen classification adapter.
//!
//! These types represent the output of classifying an image: ranked labels
//! and the per-file record the CLI emits.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source tag for labels produced by image classification.
///
/// Downstream consumers merge labels from several modalities (image, title,
/// location); this constant identifies ours.
pub const SOURCE_IMAGE: &str = "image";

/// A ranked classification label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The label name (e.g., "chameleon", "chicken")
    pub name: String,

    /// Uncertainty from 0 (maximal confidence) to 100 (none),
    /// derived as `100 - round(probability * 100)`
    pub uncertainty: u8,

    /// Broader semantic groupings (e.g., "bird", "animal")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// Origin modality, always [`SOURCE_IMAGE`] for this adapter
    pub source: String,
}

impl Label {
    /// Create a new label with the given name and uncertainty.
    pub fn new(name: impl Into<String>, uncertainty: u8) -> Self {
        Self {
            name: name.into(),
            uncertainty,
            categories: Vec::new(),
            source: SOURCE_IMAGE.to_string(),
        }
    }

    /// Create a new label with categories.
    pub fn with_categories(
        name: impl Into<String>,
        uncertainty: u8,
        categories: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            uncertainty,
            categories,
            source: SOURCE_IMAGE.to_string(),
        }
    }
}

/// The classification record for one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedImage {
    /// Path to the source file as given by the caller
    pub file_path: PathBuf,

    /// Just the filename portion
    pub file_name: String,

    /// Ranked labels, most confident first; empty when nothing cleared
    /// the confidence threshold
    pub labels: Vec<Label>,
}

impl ClassifiedImage {
    /// Build a record for `path`, deriving the filename portion.
    pub fn new(path: impl Into<PathBuf>, labels: Vec<Label>) -> Self {
        let file_path = path.into();
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_path,
            file_name,
            labels,
        }
    }
}
