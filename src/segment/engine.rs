//! Inference engine handle.
//!
//! The model session is expensive to create, so one [`SharedEngine`] per process owns it. The
//! first caller of [`SharedEngine::ensure_ready`] loads it while holding the slot lock; any
//! concurrent callers block on that same lock and then reuse the loaded backend. A failed load
//! leaves the slot empty, so the next call retries from scratch.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

use crate::foundation::error::{CutframeError, CutframeResult};

/// Single-channel mask map produced by one inference pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskTensor {
    /// Row-major values, `width * height` of them.
    pub values: Vec<f32>,
    /// Map width.
    pub width: usize,
    /// Map height.
    pub height: usize,
}

impl MaskTensor {
    /// Wrap `values`, checking the length.
    pub fn new(values: Vec<f32>, width: usize, height: usize) -> CutframeResult<Self> {
        if width == 0 || height == 0 || values.len() != width.saturating_mul(height) {
            return Err(CutframeError::inference_run(format!(
                "mask tensor has {} values for {width}x{height}",
                values.len()
            )));
        }
        Ok(Self {
            values,
            width,
            height,
        })
    }
}

/// A loaded segmentation model.
pub trait InferenceBackend: Send {
    /// Run one pass over an NCHW `[1, 3, S, S]` tensor with values in `[0, 1]`.
    fn infer(&mut self, input: Array4<f32>) -> CutframeResult<MaskTensor>;
}

/// Creates [`InferenceBackend`]s. Loading may be slow and may fail.
pub trait BackendLoader: Send + Sync {
    /// Load a fresh backend.
    fn load(&self) -> CutframeResult<Box<dyn InferenceBackend>>;
}

/// Loads an ONNX model through ONNX Runtime.
#[derive(Clone, Debug)]
pub struct OrtLoader {
    model_path: PathBuf,
}

impl OrtLoader {
    /// Loader for the model file at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
        }
    }

    /// Model file path.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl BackendLoader for OrtLoader {
    fn load(&self) -> CutframeResult<Box<dyn InferenceBackend>> {
        if !self.model_path.is_file() {
            return Err(CutframeError::inference_init(format!(
                "model not found at '{}'",
                self.model_path.display()
            )));
        }
        let session = Session::builder()
            .and_then(|b| b.commit_from_file(&self.model_path))
            .map_err(|e| CutframeError::inference_init(format!("create ort session: {e}")))?;
        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| CutframeError::inference_init("model declares no inputs"))?;
        tracing::info!(model = %self.model_path.display(), input = %input_name, "segmentation model loaded");
        Ok(Box::new(OrtBackend {
            session,
            input_name,
        }))
    }
}

/// ONNX Runtime session wrapper.
pub struct OrtBackend {
    session: Session,
    input_name: String,
}

impl std::fmt::Debug for OrtBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtBackend")
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl InferenceBackend for OrtBackend {
    fn infer(&mut self, input: Array4<f32>) -> CutframeResult<MaskTensor> {
        let value = Value::from_array(input)
            .map_err(|e| CutframeError::inference_run(format!("build input tensor: {e}")))?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => value])
            .map_err(|e| CutframeError::inference_run(format!("run session: {e}")))?;
        let arr = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| CutframeError::inference_run(format!("extract mask: {e}")))?;

        // Saliency models emit [1, 1, H, W], [1, H, W] or [H, W].
        let shape = arr.shape();
        let (h, w) = match shape.len() {
            4 => (shape[2], shape[3]),
            3 => (shape[1], shape[2]),
            2 => (shape[0], shape[1]),
            n => {
                return Err(CutframeError::inference_run(format!(
                    "unexpected mask rank {n}"
                )));
            }
        };
        let values: Vec<f32> = arr.iter().take(w * h).copied().collect();
        MaskTensor::new(values, w, h)
    }
}

type BackendCell = Arc<Mutex<Box<dyn InferenceBackend>>>;

fn lock<T: ?Sized>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Lazily initialized, shareable inference engine.
pub struct SharedEngine {
    loader: Box<dyn BackendLoader>,
    slot: Mutex<Option<BackendCell>>,
}

impl std::fmt::Debug for SharedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEngine")
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl SharedEngine {
    /// Engine that loads its backend through `loader` on first use.
    pub fn new(loader: impl BackendLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slot: Mutex::new(None),
        }
    }

    /// Return the loaded backend, loading it first if needed.
    ///
    /// Idempotent; concurrent callers share a single load. Errors are `InferenceInit` and
    /// leave the engine unloaded.
    pub fn ensure_ready(&self) -> CutframeResult<EngineHandle> {
        let mut slot = lock(&self.slot);
        if let Some(cell) = slot.as_ref() {
            return Ok(EngineHandle {
                cell: Arc::clone(cell),
            });
        }
        let backend = match self.loader.load() {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "inference engine failed to initialize");
                return Err(match err {
                    CutframeError::InferenceInit(_) => err,
                    other => CutframeError::inference_init(other.to_string()),
                });
            }
        };
        let cell: BackendCell = Arc::new(Mutex::new(backend));
        *slot = Some(Arc::clone(&cell));
        Ok(EngineHandle { cell })
    }

    /// Drop the cached backend so the next [`SharedEngine::ensure_ready`] reloads it.
    pub fn invalidate(&self) {
        *lock(&self.slot) = None;
    }

    /// Return `true` when a backend is loaded.
    pub fn is_ready(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

/// Shared reference to a loaded backend.
#[derive(Clone)]
pub struct EngineHandle {
    cell: BackendCell,
}

impl EngineHandle {
    /// Run one inference pass. Passes through the same handle are serialized.
    pub fn infer(&self, input: Array4<f32>) -> CutframeResult<MaskTensor> {
        lock(&self.cell).infer(input)
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").finish_non_exhaustive()
    }
}

/// Process-wide engine backed by [`OrtLoader`] on `model_path`.
///
/// The first call fixes the model path; later calls with a different path get the same engine
/// and a warning.
pub fn global_engine(model_path: &Path) -> Arc<SharedEngine> {
    static ENGINE: OnceLock<(PathBuf, Arc<SharedEngine>)> = OnceLock::new();
    let (path, engine) = ENGINE.get_or_init(|| {
        (
            model_path.to_path_buf(),
            Arc::new(SharedEngine::new(OrtLoader::new(model_path))),
        )
    });
    if path != model_path {
        tracing::warn!(
            active = %path.display(),
            requested = %model_path.display(),
            "global engine already bound to another model"
        );
    }
    Arc::clone(engine)
}

#[cfg(test)]
#[path = "../../tests/unit/segment/engine.rs"]
mod tests;
