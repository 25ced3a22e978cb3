//! Engine tunables.
//!
//! Defaults are compiled in; a JSON file may override them and `CUTFRAME_*` environment
//! variables override both. Unparseable or out-of-range environment values are ignored.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{CutframeError, CutframeResult};

/// Tunables shared by the segmentation pipeline and the compositor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Longest output edge in preview mode.
    pub preview_max_dim: u32,
    /// Longest output edge in export mode.
    pub export_max_dim: u32,
    /// Longest edge of the segmentation working image.
    pub working_max_dim: u32,
    /// Square input resolution expected by the segmentation model.
    pub model_input_size: u32,
    /// Alpha above which a pixel counts as subject when cropping.
    pub alpha_threshold: u8,
    /// Padding in working-image pixels added around the crop box.
    pub crop_padding: u32,
    /// JPEG quality for export encoding (1..=100).
    pub jpeg_quality: u8,
    /// Label stamped on export frames.
    pub watermark_text: String,
    /// Straight RGBA color export frames are flattened onto before lossy encoding.
    pub background_rgba: [u8; 4],
    /// Path of the ONNX segmentation model.
    pub model_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_max_dim: 1024,
            export_max_dim: 2048,
            working_max_dim: 1536,
            model_input_size: 1024,
            alpha_threshold: 10,
            crop_padding: 10,
            jpeg_quality: 92,
            watermark_text: "cutframe".to_string(),
            background_rgba: [255, 255, 255, 255],
            model_path: None,
        }
    }
}

impl EngineConfig {
    /// Defaults with `CUTFRAME_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn from_path(path: impl AsRef<Path>) -> CutframeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| CutframeError::validation(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `CUTFRAME_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        let dim = |key: &str| {
            get(key)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|&n| n > 0)
        };
        if let Some(n) = dim("CUTFRAME_PREVIEW_MAX_DIM") {
            self.preview_max_dim = n;
        }
        if let Some(n) = dim("CUTFRAME_EXPORT_MAX_DIM") {
            self.export_max_dim = n;
        }
        if let Some(n) = dim("CUTFRAME_WORKING_MAX_DIM") {
            self.working_max_dim = n;
        }
        if let Some(n) = dim("CUTFRAME_MODEL_INPUT_SIZE") {
            self.model_input_size = n;
        }
        if let Some(q) = get("CUTFRAME_JPEG_QUALITY")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|q| (1..=100).contains(q))
        {
            self.jpeg_quality = q;
        }
        if let Some(t) = get("CUTFRAME_ALPHA_THRESHOLD").and_then(|v| v.trim().parse::<u8>().ok()) {
            self.alpha_threshold = t;
        }
        if let Some(p) = get("CUTFRAME_CROP_PADDING").and_then(|v| v.trim().parse::<u32>().ok()) {
            self.crop_padding = p;
        }
        if let Some(text) = get("CUTFRAME_WATERMARK_TEXT") {
            self.watermark_text = text;
        }
        if let Some(path) = get("CUTFRAME_MODEL_PATH").filter(|p| !p.trim().is_empty()) {
            self.model_path = Some(PathBuf::from(path));
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> CutframeResult<()> {
        if self.preview_max_dim == 0 || self.export_max_dim == 0 {
            return Err(CutframeError::validation("resolution caps must be > 0"));
        }
        if self.working_max_dim == 0 || self.model_input_size == 0 {
            return Err(CutframeError::validation(
                "working size and model input size must be > 0",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CutframeError::validation("jpeg quality must be in 1..=100"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
