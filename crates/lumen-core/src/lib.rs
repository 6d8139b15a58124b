//! Lumen Core - Embeddable image classification library.
//!
//! Lumen takes image bytes as input and outputs ranked semantic labels
//! with confidence-derived uncertainty scores, using a pretrained
//! convolutional classifier running locally via ONNX Runtime.
//!
//! # Architecture
//!
//! ```text
//! Image bytes → Decode + Tensor → Infer (ONNX) → Rank (labels.txt) → Labels
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Config, ImageClassifier};
//!
//! let config = Config::load()?;
//! let classifier = ImageClassifier::new(config.active_model_dir(), false);
//!
//! let labels = classifier.classify_file("./chameleon.jpg")?;
//! for label in labels {
//!     println!("{} ({}% uncertain)", label.name, label.uncertainty);
//! }
//! ```

// Module declarations
pub mod classifier;
pub mod config;
pub mod error;
pub mod inference;
pub mod labeling;
pub mod output;
pub mod types;

// Re-exports for convenient access
pub use classifier::ImageClassifier;
pub use config::Config;
pub use error::{
    ClassifyError, ClassifyResult, ConfigError, DecodeError, InferenceError, LabelLoadError,
    ModelLoadError,
};
pub use inference::{InferenceEngine, ModelSession};
pub use labeling::{rank, LabelEntry, LabelTable, RankOptions};
pub use output::{OutputFormat, OutputWriter};
pub use types::{ClassifiedImage, Label, SOURCE_IMAGE};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
