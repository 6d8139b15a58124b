//! ONNX model session management and inference invocation.
//!
//! Loads the classifier graph exported to ONNX format and runs it on
//! preprocessed image tensors, producing the raw class probability vector.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::error::{InferenceError, ModelLoadError};

use super::preprocess::INPUT_SIZE;

/// The classifier ONNX model filename within the model directory.
pub const MODEL_FILENAME: &str = "model.onnx";

/// State behind the session mutex: the loaded graph plus the metadata
/// needed to feed it.
struct LoadedGraph {
    session: Session,
    /// Name of the input tensor (detected from model metadata).
    input_name: String,
    /// Path the graph was loaded from; repeated loads of it are no-ops.
    model_path: PathBuf,
}

/// Wraps an ONNX Runtime session for image classification.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`; inference
/// calls from concurrent callers serialize on it.
pub struct ModelSession {
    graph: Mutex<Option<LoadedGraph>>,
}

impl Default for ModelSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSession {
    /// Create an empty session; no graph is loaded until `initialize`.
    pub fn new() -> Self {
        Self {
            graph: Mutex::new(None),
        }
    }

    /// Load the classifier graph from `{model_dir}/model.onnx`.
    ///
    /// Idempotent for a given directory: calling again with the same path
    /// keeps the already-loaded graph, while a different path reloads.
    pub fn initialize(&self, model_dir: &Path) -> Result<(), ModelLoadError> {
        let model_path = model_dir.join(MODEL_FILENAME);

        let mut graph = self
            .graph
            .lock()
            .map_err(|e| ModelLoadError::Session {
                path: model_path.clone(),
                message: format!("Session lock poisoned: {e}"),
            })?;

        if let Some(loaded) = graph.as_ref() {
            if loaded.model_path == model_path {
                return Ok(());
            }
        }

        if !model_path.exists() {
            return Err(ModelLoadError::NotFound(model_path));
        }

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Session {
                path: model_path.clone(),
                message: format!("Failed to create ONNX session builder: {e}"),
            })?
            .commit_from_file(&model_path)
            .map_err(|e| ModelLoadError::Session {
                path: model_path.clone(),
                message: format!("Failed to load ONNX model: {e}"),
            })?;

        // Detect the input tensor name from model metadata.
        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "input".to_string());

        tracing::debug!(
            "Loaded classifier model from {:?} (input: {:?}, outputs: {:?})",
            model_path,
            input_name,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        *graph = Some(LoadedGraph {
            session,
            input_name,
            model_path,
        });

        Ok(())
    }

    /// Run the loaded graph on a preprocessed image tensor.
    ///
    /// Input shape: \[1, 224, 224, 3\] (NHWC, normalized to \[-1, 1\]).
    /// Output: the class probability vector, one entry per model class.
    pub fn infer(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let expected = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 3];
        if tensor.shape() != expected {
            return Err(InferenceError::ShapeMismatch {
                expected: expected.to_vec(),
                actual: tensor.shape().to_vec(),
            });
        }

        // Convert ndarray to (shape, flat_data) for ort (avoids ndarray feature dependency).
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value =
            Value::from_array((shape, flat_data)).map_err(|e| InferenceError::Execution {
                message: format!("Failed to create input tensor: {e}"),
            })?;

        let mut graph = self.graph.lock().map_err(|e| InferenceError::Execution {
            message: format!("Session lock poisoned: {e}"),
        })?;
        let loaded = graph.as_mut().ok_or(InferenceError::NotInitialized)?;

        let inputs = ort::inputs![loaded.input_name.as_str() => input_value];

        let outputs = loaded
            .session
            .run(inputs)
            .map_err(|e| InferenceError::Execution {
                message: format!("ONNX inference failed: {e}"),
            })?;

        // The probability vector is the model's sole output.
        let (output_name, output_value) =
            outputs.iter().next().ok_or_else(|| InferenceError::Execution {
                message: "Model produced no outputs".to_string(),
            })?;

        let (out_shape, data) =
            output_value
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Execution {
                    message: format!("Failed to extract output tensor: {e}"),
                })?;

        // Output is [classes] or [1, classes] depending on the export.
        let probabilities = match out_shape.len() {
            1 => data.to_vec(),
            2 => {
                let classes = out_shape[1] as usize;
                data[..classes].to_vec()
            }
            _ => {
                return Err(InferenceError::Execution {
                    message: format!(
                        "Unexpected output shape {:?} from {:?}",
                        out_shape, output_name
                    ),
                });
            }
        };

        tracing::trace!("Inference produced {} class probabilities", probabilities.len());
        Ok(probabilities)
    }
}

impl super::InferenceEngine for ModelSession {
    fn name(&self) -> &str {
        "onnx"
    }

    fn initialize(&self, model_dir: &Path) -> Result<(), ModelLoadError> {
        ModelSession::initialize(self, model_dir)
    }

    fn infer(&self, tensor: &Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        ModelSession::infer(self, tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let session = ModelSession::new();

        let err = session.initialize(dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
        assert!(err.to_string().contains("Model not found"));
    }

    #[test]
    fn test_initialize_rejects_invalid_model_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MODEL_FILENAME), b"not an onnx graph").unwrap();

        let session = ModelSession::new();
        let err = session.initialize(dir.path()).unwrap_err();
        assert!(matches!(err, ModelLoadError::Session { .. }));
    }

    #[test]
    fn test_infer_before_initialize() {
        let session = ModelSession::new();
        let tensor = Array4::<f32>::zeros((1, 224, 224, 3));

        let err = session.infer(&tensor).unwrap_err();
        assert!(matches!(err, InferenceError::NotInitialized));
    }

    #[test]
    fn test_infer_rejects_wrong_shape() {
        let session = ModelSession::new();
        let tensor = Array4::<f32>::zeros((1, 3, 224, 224));

        let err = session.infer(&tensor).unwrap_err();
        match err {
            InferenceError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, vec![1, 224, 224, 3]);
                assert_eq!(actual, vec![1, 3, 224, 224]);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }
}
