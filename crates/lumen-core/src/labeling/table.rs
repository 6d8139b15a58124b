//! Label table loading for classification post-processing.
//!
//! Loads the class-index-to-label mapping from `labels.txt` in the model
//! directory. Each line describes one output index: name, priority, and
//! optional category and alias lists used for ranking and deduplication.

use std::path::Path;

use crate::error::LabelLoadError;

/// The label definition filename within the model directory.
pub const LABELS_FILENAME: &str = "labels.txt";

/// A single label entry, keyed by its zero-based output-vector index.
#[derive(Debug, Clone)]
pub struct LabelEntry {
    /// Label name (e.g., "chicken")
    pub name: String,
    /// Tie-break weight when two candidates share an uncertainty
    pub priority: i32,
    /// Broader semantic groupings (e.g., "bird")
    pub categories: Vec<String>,
    /// Alternate names considered equal during deduplication
    pub aliases: Vec<String>,
}

/// A loaded label table ready for ranking.
///
/// Immutable after load; entry position is the model's output index.
#[derive(Debug, Clone)]
pub struct LabelTable {
    entries: Vec<LabelEntry>,
}

impl LabelTable {
    /// Load a label table from a `labels.txt` file.
    ///
    /// One tab-separated entry per line, in output-index order:
    /// `name<TAB>priority<TAB>cat|cat<TAB>alias|alias`. The category and
    /// alias fields may be omitted. Lines starting with `#` and blank
    /// lines are skipped without consuming an index.
    pub fn load(path: &Path) -> Result<Self, LabelLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| LabelLoadError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut entries = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 {
                return Err(LabelLoadError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    message: "expected at least name and priority fields".to_string(),
                });
            }

            let name = parts[0].trim().to_string();
            if name.is_empty() {
                return Err(LabelLoadError::Malformed {
                    path: path.to_path_buf(),
                    line: lineno + 1,
                    message: "empty label name".to_string(),
                });
            }

            let priority: i32 =
                parts[1]
                    .trim()
                    .parse()
                    .map_err(|_| LabelLoadError::Malformed {
                        path: path.to_path_buf(),
                        line: lineno + 1,
                        message: format!("invalid priority {:?}", parts[1]),
                    })?;

            let categories = split_list(parts.get(2));
            let aliases = split_list(parts.get(3));

            entries.push(LabelEntry {
                name,
                priority,
                categories,
                aliases,
            });
        }

        tracing::debug!("Loaded label table: {} entries from {:?}", entries.len(), path);

        Ok(Self { entries })
    }

    /// Create an empty table.
    ///
    /// Ranking against it yields empty results, which is the degraded
    /// behavior for callers that never need labels (e.g. disabled mode).
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// Build a table directly from entries, in output-index order.
    ///
    /// Lets embedders and tests supply a synthetic table without a file.
    pub fn from_entries(entries: Vec<LabelEntry>) -> Self {
        Self { entries }
    }

    /// Look up the entry for an output-vector index.
    pub fn get(&self, index: usize) -> Option<&LabelEntry> {
        self.entries.get(index)
    }

    /// All entries in output-index order.
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split a '|'-separated list field, treating a missing or empty field
/// as an empty list.
fn split_list(field: Option<&&str>) -> Vec<String> {
    match field {
        Some(s) if !s.trim().is_empty() => s
            .split('|')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
