//! Classification facade - wires decoding, inference, and ranking together.
//!
//! `ImageClassifier` owns the inference engine and the label table, guards
//! the once-only model load behind an explicit state machine, and exposes
//! the two entry points callers use: `classify_file` and `classify_bytes`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::ImageClassifier;
//!
//! let classifier = ImageClassifier::new("~/.lumen/models/nasnet", false);
//! let labels = classifier.classify_file("./chameleon.jpg")?;
//! // labels[0].name == "chameleon", labels[0].uncertainty == 7
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use std::time::Instant;

use crate::error::{ClassifyError, ClassifyResult};
use crate::inference::{tensor_from_bytes, InferenceEngine, ModelSession};
use crate::labeling::{rank, LabelTable, RankOptions, LABELS_FILENAME};
use crate::types::Label;

/// Lifecycle state of the classifier.
///
/// The model-loading span is the time the state mutex is held by the first
/// caller; latecomers block on the lock and then observe `Ready` or
/// `Failed`, so the load runs at most once.
enum AdapterState {
    /// Construction-time bypass: every classify call returns empty
    Disabled,
    /// Nothing loaded yet; the first non-disabled call triggers the load
    Uninitialized,
    /// Model and label table loaded, table shared read-only
    Ready(Arc<LabelTable>),
    /// Model or label load failed; the error is cached, never retried
    Failed(ClassifyError),
}

/// The image classification adapter.
pub struct ImageClassifier {
    engine: Box<dyn InferenceEngine>,
    model_dir: PathBuf,
    options: RankOptions,
    state: Mutex<AdapterState>,
    mismatch_warned: Once,
}

impl ImageClassifier {
    /// Create a classifier backed by the ONNX engine.
    ///
    /// `model_dir` must contain `model.onnx` and `labels.txt`; neither is
    /// touched until the first classify call (or an eager `initialize`).
    /// When `disabled` is set, no model work ever happens and every
    /// classify call returns an empty result.
    pub fn new(model_dir: impl Into<PathBuf>, disabled: bool) -> Self {
        Self::with_options(model_dir, disabled, RankOptions::default())
    }

    /// Create a classifier with explicit ranking options.
    pub fn with_options(
        model_dir: impl Into<PathBuf>,
        disabled: bool,
        options: RankOptions,
    ) -> Self {
        Self {
            engine: Box::new(ModelSession::new()),
            model_dir: model_dir.into(),
            options,
            state: Mutex::new(if disabled {
                AdapterState::Disabled
            } else {
                AdapterState::Uninitialized
            }),
            mismatch_warned: Once::new(),
        }
    }

    /// Create a classifier over a caller-supplied engine.
    ///
    /// This is the injection seam: embedders pick a different backend and
    /// tests substitute a double returning canned probability vectors.
    /// The label table is still loaded from `{model_dir}/labels.txt`.
    pub fn with_engine(
        engine: Box<dyn InferenceEngine>,
        model_dir: impl Into<PathBuf>,
        options: RankOptions,
    ) -> Self {
        Self {
            engine,
            model_dir: model_dir.into(),
            options,
            state: Mutex::new(AdapterState::Uninitialized),
            mismatch_warned: Once::new(),
        }
    }

    /// Whether this classifier was constructed in disabled mode.
    pub fn is_disabled(&self) -> bool {
        matches!(*self.lock_state(), AdapterState::Disabled)
    }

    /// The loaded label table; empty unless the classifier is ready.
    pub fn labels(&self) -> Arc<LabelTable> {
        match &*self.lock_state() {
            AdapterState::Ready(table) => Arc::clone(table),
            _ => Arc::new(LabelTable::empty()),
        }
    }

    /// Load the model and label table now rather than on first use.
    ///
    /// A no-op when disabled or already loaded; returns the cached error
    /// when a previous load failed.
    pub fn initialize(&self) -> ClassifyResult<()> {
        self.ensure_ready().map(|_| ())
    }

    /// Classify the image file at `path`.
    ///
    /// Reads the file fully into memory and delegates to the byte path.
    /// Disabled mode short-circuits before the file is touched.
    pub fn classify_file(&self, path: impl AsRef<Path>) -> ClassifyResult<Vec<Label>> {
        let path = path.as_ref();
        if self.is_disabled() {
            return Ok(Vec::new());
        }

        let bytes = std::fs::read(path).map_err(|e| ClassifyError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!("Classifying {:?} ({} bytes)", path, bytes.len());
        self.classify_inner(&bytes, path.extension().and_then(|e| e.to_str()))
    }

    /// Classify an in-memory image byte buffer.
    ///
    /// Returns an empty result and no error for any input when disabled.
    /// Otherwise decodes, infers, and ranks; an image where no class
    /// clears the threshold is an empty result, not an error.
    pub fn classify_bytes(&self, bytes: &[u8]) -> ClassifyResult<Vec<Label>> {
        self.classify_inner(bytes, None)
    }

    fn classify_inner(
        &self,
        bytes: &[u8],
        format_hint: Option<&str>,
    ) -> ClassifyResult<Vec<Label>> {
        let table = match self.ensure_ready()? {
            Some(table) => table,
            None => return Ok(Vec::new()),
        };

        let start = Instant::now();
        let tensor = tensor_from_bytes(bytes, format_hint)?;
        tracing::trace!("  Tensor: {:?}", start.elapsed());

        let infer_start = Instant::now();
        let probabilities = self.engine.infer(&tensor)?;
        tracing::trace!("  Inference: {:?}", infer_start.elapsed());

        if probabilities.len() != table.len() {
            self.mismatch_warned.call_once(|| {
                tracing::warn!(
                    "Model produced {} classes for a table of {} labels",
                    probabilities.len(),
                    table.len()
                );
            });
        }

        let labels = rank(&probabilities, &table, &self.options);
        tracing::debug!(
            "Classified {} bytes into {} labels in {:?}",
            bytes.len(),
            labels.len(),
            start.elapsed()
        );
        Ok(labels)
    }

    /// Transition to `Ready` if this is the first non-disabled call.
    ///
    /// Returns the shared label table, or `None` in disabled mode. The
    /// state lock is held across the load so concurrent first calls
    /// cannot race a second one.
    fn ensure_ready(&self) -> ClassifyResult<Option<Arc<LabelTable>>> {
        let mut state = self.lock_state();
        match &*state {
            AdapterState::Disabled => return Ok(None),
            AdapterState::Ready(table) => return Ok(Some(Arc::clone(table))),
            AdapterState::Failed(err) => return Err(err.clone()),
            AdapterState::Uninitialized => {}
        }

        match self.load() {
            Ok(table) => {
                let table = Arc::new(table);
                *state = AdapterState::Ready(Arc::clone(&table));
                Ok(Some(table))
            }
            Err(err) => {
                *state = AdapterState::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn load(&self) -> ClassifyResult<LabelTable> {
        let start = Instant::now();
        tracing::debug!(
            "Initializing {} classifier from {:?}",
            self.engine.name(),
            self.model_dir
        );

        self.engine.initialize(&self.model_dir)?;
        let table = LabelTable::load(&self.model_dir.join(LABELS_FILENAME))?;

        tracing::debug!(
            "Classifier ready: {} labels in {:?}",
            table.len(),
            start.elapsed()
        );
        Ok(table)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, AdapterState> {
        // A poisoned lock can only leave Disabled, Uninitialized, or a
        // completed state behind, all safe to keep using.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
