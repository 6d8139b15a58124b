//! Model loading, image preprocessing, and inference invocation.
//!
//! This module turns image bytes into the classifier's input tensor and
//! runs the ONNX graph on it, producing the raw probability vector that
//! the ranking pass consumes.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::inference::{tensor_from_bytes, InferenceEngine, ModelSession};
//!
//! let session = ModelSession::new();
//! session.initialize(&model_dir)?;
//! let tensor = tensor_from_bytes(&bytes, Some("jpeg"))?;
//! let probabilities = session.infer(&tensor)?;
//! ```

pub mod preprocess;
pub mod session;

use std::path::Path;

use ndarray::Array4;

use crate::error::{InferenceError, ModelLoadError};

pub use preprocess::{build_tensor, decode_image, tensor_from_bytes, INPUT_SIZE};
pub use session::{ModelSession, MODEL_FILENAME};

/// The capability the classification facade drives the engine through.
///
/// Object-safe (`Box<dyn InferenceEngine>`) so tests can swap the ONNX
/// session for a double returning canned probability vectors.
pub trait InferenceEngine: Send + Sync {
    /// Engine name for logging (e.g., "onnx").
    fn name(&self) -> &str;

    /// Load the serialized model graph from the given directory.
    ///
    /// Idempotent for an unchanged directory; a different directory reloads.
    fn initialize(&self, model_dir: &Path) -> Result<(), ModelLoadError>;

    /// Run the loaded graph on an input tensor, returning one probability
    /// per model class.
    fn infer(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}
