//! Label metadata and probability ranking.
//!
//! Turns the classifier's raw probability vector into a short list of
//! human-meaningful labels using the per-class metadata from `labels.txt`.

pub mod ranker;
pub mod table;

pub use ranker::{rank, RankOptions};
pub use table::{LabelEntry, LabelTable, LABELS_FILENAME};
