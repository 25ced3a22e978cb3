//! Theme layer images, resolved through a [`LayerSource`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::assets::decode::decode_image;
use crate::foundation::core::ImageRgba8;
use crate::foundation::error::{CutframeError, CutframeResult};

/// Resolves a theme layer reference into pixels.
pub trait LayerSource: Send + Sync {
    /// Load the image named by `reference`.
    fn load(&self, reference: &str) -> CutframeResult<Arc<ImageRgba8>>;
}

/// Normalize and validate theme-relative layer paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CutframeResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CutframeError::validation("layer paths must be relative"));
    }
    if s.is_empty() {
        return Err(CutframeError::validation("layer path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CutframeError::validation("layer paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CutframeError::validation(
            "layer path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Loads layers from files under a root directory, decoding each one once.
#[derive(Debug)]
pub struct DirLayerSource {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<ImageRgba8>>>,
}

impl DirLayerSource {
    /// Resolve references relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Root directory references are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LayerSource for DirLayerSource {
    fn load(&self, reference: &str) -> CutframeResult<Arc<ImageRgba8>> {
        let norm = normalize_rel_path(reference)
            .map_err(|e| CutframeError::layer_load(format!("'{reference}': {e}")))?;
        if let Some(hit) = self
            .cache
            .read()
            .ok()
            .and_then(|c| c.get(&norm).cloned())
        {
            return Ok(hit);
        }

        let path = self.root.join(Path::new(&norm));
        let bytes = std::fs::read(&path).map_err(|e| {
            CutframeError::layer_load(format!("failed to read '{}': {e}", path.display()))
        })?;
        let img = decode_image(&bytes)
            .map_err(|e| CutframeError::layer_load(format!("'{}': {e}", path.display())))?;
        let img = Arc::new(img);
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(norm, img.clone());
        }
        Ok(img)
    }
}

/// In-memory layers keyed by reference.
#[derive(Debug, Default, Clone)]
pub struct MemoryLayerSource {
    layers: HashMap<String, Arc<ImageRgba8>>,
}

impl MemoryLayerSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `img` under `reference`.
    pub fn insert(&mut self, reference: impl Into<String>, img: ImageRgba8) {
        self.layers.insert(reference.into(), Arc::new(img));
    }

    /// Builder-style [`MemoryLayerSource::insert`].
    pub fn with(mut self, reference: impl Into<String>, img: ImageRgba8) -> Self {
        self.insert(reference, img);
        self
    }
}

impl LayerSource for MemoryLayerSource {
    fn load(&self, reference: &str) -> CutframeResult<Arc<ImageRgba8>> {
        self.layers
            .get(reference)
            .cloned()
            .ok_or_else(|| CutframeError::layer_load(format!("no layer named '{reference}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/layers.rs"]
mod tests;
