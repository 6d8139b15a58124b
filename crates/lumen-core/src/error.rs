//! Error types for the Lumen classification adapter.
//!
//! Errors are organized by stage so callers can tell a missing model from a
//! bad image from a misconfigured run, with relevant context (paths, line
//! numbers, engine messages) carried in the variants.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Model loading errors.
///
/// `NotFound` is its own variant so callers can detect a missing model
/// (a setup problem) without string-matching the message.
#[derive(Error, Debug, Clone)]
pub enum ModelLoadError {
    /// No serialized model at the expected location
    #[error("Model not found: {0}")]
    NotFound(PathBuf),

    /// The engine rejected the model file
    #[error("Failed to load model from {path}: {message}")]
    Session { path: PathBuf, message: String },
}

/// Label table loading errors.
#[derive(Error, Debug, Clone)]
pub enum LabelLoadError {
    /// Failed to read the label file from disk
    #[error("Failed to read label file {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// A line in the label file does not parse
    #[error("Malformed label entry at {path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Image decoding errors.
///
/// `UnknownFormat` is distinct from `Malformed` so that "this is not an
/// image at all" (a document handed to the classifier) stays separable
/// from "this image is truncated or corrupt".
#[derive(Error, Debug, Clone)]
pub enum DecodeError {
    /// The buffer is not in any recognized image format
    #[error("Unknown or invalid image format")]
    UnknownFormat,

    /// The format was recognized but decoding failed
    #[error("Failed to decode image: {message}")]
    Malformed { message: String },
}

/// Inference invocation errors.
#[derive(Error, Debug, Clone)]
pub enum InferenceError {
    /// `infer` called before the session was initialized
    #[error("Model session not initialized")]
    NotInitialized,

    /// Input tensor does not match the model's expected input shape
    #[error("Tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The engine failed while running the graph
    #[error("Inference failed: {message}")]
    Execution { message: String },
}

/// Facade-level classification errors.
///
/// Wraps the stage errors plus file I/O when classifying from a path. All
/// variants are `Clone` because a failed model load is cached and returned
/// again on subsequent calls.
#[derive(Error, Debug, Clone)]
pub enum ClassifyError {
    /// Model could not be loaded
    #[error("Model error: {0}")]
    Model(#[from] ModelLoadError),

    /// Label table could not be loaded
    #[error("Label error: {0}")]
    Labels(#[from] LabelLoadError),

    /// Input bytes could not be decoded as an image
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Inference invocation failed
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Reading the input file failed; message carries the OS detail
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Convenience type alias for classification results.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;
