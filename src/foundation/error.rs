/// Result alias used across the crate.
pub type CutframeResult<T> = Result<T, CutframeError>;

/// Error kinds surfaced by the segmentation pipeline, the compositor and their helpers.
#[derive(thiserror::Error, Debug)]
pub enum CutframeError {
    /// Invalid input (theme, config, buffer shape).
    #[error("validation error: {0}")]
    Validation(String),

    /// A photo or layer could not be decoded into pixels.
    #[error("decode error: {0}")]
    Decode(String),

    /// The inference engine failed to initialize. Retryable on the next call.
    #[error("inference init error: {0}")]
    InferenceInit(String),

    /// A specific inference invocation failed.
    #[error("inference run error: {0}")]
    InferenceRun(String),

    /// A theme layer image failed to load during composition.
    #[error("layer load error: {0}")]
    LayerLoad(String),

    /// The final buffer could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// Internal evaluation failure (raster, buffer bookkeeping).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CutframeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn inference_init(msg: impl Into<String>) -> Self {
        Self::InferenceInit(msg.into())
    }

    pub fn inference_run(msg: impl Into<String>) -> Self {
        Self::InferenceRun(msg.into())
    }

    pub fn layer_load(msg: impl Into<String>) -> Self {
        Self::LayerLoad(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Only a failed engine initialization is worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InferenceInit(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
