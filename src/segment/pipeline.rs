//! Photo to transparent cut-out.
//!
//! 1. decode, downscale to the working size (the full-size decode is dropped here)
//! 2. resize to the square model input, scale channels to `[0, 1]`
//! 3. one inference pass
//! 4. squash through a logistic if the raw output does not look like probabilities
//! 5. min-max stretch to 0..=255, resample to the working size
//! 6. write as alpha
//! 7. crop to the padded alpha bounds

use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, RgbaImage};
use ndarray::Array4;

use crate::assets::decode::decode_dynamic;
use crate::config::EngineConfig;
use crate::foundation::core::ImageRgba8;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::segment::crop::crop_to_alpha;
use crate::segment::engine::{MaskTensor, SharedEngine};

/// How many leading mask values are sampled to decide on the squash.
pub const SQUASH_SAMPLE: usize = 100;
const PROBABILITY_RANGE: std::ops::RangeInclusive<f32> = -0.01..=1.01;

/// Outcome of one segmentation. Never a panic or an `Err`; failures land in `error`.
#[derive(Debug)]
pub struct SegmentationResult {
    /// Whether `cutout` holds a result.
    pub success: bool,
    /// Cropped straight-alpha cut-out.
    pub cutout: Option<ImageRgba8>,
    /// What went wrong, keeping its kind.
    pub error: Option<CutframeError>,
}

impl SegmentationResult {
    fn succeeded(cutout: ImageRgba8) -> Self {
        Self {
            success: true,
            cutout: Some(cutout),
            error: None,
        }
    }

    fn failed(error: CutframeError) -> Self {
        Self {
            success: false,
            cutout: None,
            error: Some(error),
        }
    }

    /// Human-readable failure message, if any.
    pub fn message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Convert into a plain `Result`.
    pub fn into_result(self) -> CutframeResult<ImageRgba8> {
        match (self.cutout, self.error) {
            (Some(img), None) => Ok(img),
            (_, Some(err)) => Err(err),
            (None, None) => Err(CutframeError::evaluation("segmentation produced no cut-out")),
        }
    }
}

/// Runs the segmentation pipeline against a shared engine.
#[derive(Debug, Clone)]
pub struct Segmenter {
    engine: Arc<SharedEngine>,
    config: EngineConfig,
}

impl Segmenter {
    /// Segmenter over `engine` with the given tunables.
    pub fn new(engine: Arc<SharedEngine>, config: EngineConfig) -> Self {
        Self { engine, config }
    }

    /// The shared engine.
    pub fn engine(&self) -> &Arc<SharedEngine> {
        &self.engine
    }

    /// Cut the dominant subject out of an encoded photo.
    #[tracing::instrument(skip_all, fields(bytes = photo.len()))]
    pub fn segment(&self, photo: &[u8]) -> SegmentationResult {
        match self.try_segment(photo) {
            Ok(cutout) => {
                tracing::info!(width = cutout.width, height = cutout.height, "segmentation complete");
                SegmentationResult::succeeded(cutout)
            }
            Err(err) => {
                tracing::warn!(error = %err, "segmentation failed");
                SegmentationResult::failed(err)
            }
        }
    }

    fn try_segment(&self, photo: &[u8]) -> CutframeResult<ImageRgba8> {
        let working = working_image(decode_dynamic(photo)?, self.config.working_max_dim);
        let (w, h) = working.dimensions();
        tracing::debug!(width = w, height = h, "working image ready");

        let input = input_tensor(&working, self.config.model_input_size);
        let mask = self.engine.ensure_ready()?.infer(input)?;
        tracing::debug!(width = mask.width, height = mask.height, "mask produced");

        let alpha = mask_to_alpha(mask, w, h)?;
        let mut cutout = working;
        for (px, a) in cutout.pixels_mut().zip(alpha.pixels()) {
            px.0[3] = a.0[0];
        }
        crop_to_alpha(
            ImageRgba8::from_image(cutout),
            self.config.alpha_threshold,
            self.config.crop_padding,
        )
    }
}

/// Aspect-preserving downscale so neither side exceeds `max_dim`. Consumes the decoded photo.
pub(crate) fn working_image(photo: DynamicImage, max_dim: u32) -> RgbaImage {
    let longest = photo.width().max(photo.height());
    if longest <= max_dim {
        return photo.into_rgba8();
    }
    let scale = f64::from(max_dim) / f64::from(longest);
    let w = ((f64::from(photo.width()) * scale).round() as u32).max(1);
    let h = ((f64::from(photo.height()) * scale).round() as u32).max(1);
    photo.resize_exact(w, h, FilterType::Triangle).into_rgba8()
}

/// `[1, 3, size, size]` tensor, RGB channels scaled to `[0, 1]`, no mean/std normalization.
pub(crate) fn input_tensor(working: &RgbaImage, size: u32) -> Array4<f32> {
    let resized = image::imageops::resize(working, size, size, FilterType::Triangle);
    let s = size as usize;
    let mut input = Array4::<f32>::zeros((1, 3, s, s));
    for (x, y, px) in resized.enumerate_pixels() {
        for c in 0..3 {
            input[[0, c, y as usize, x as usize]] = f32::from(px.0[c]) / 255.0;
        }
    }
    input
}

/// Return `true` when any of the first [`SQUASH_SAMPLE`] values falls outside `[-0.01, 1.01]`.
pub(crate) fn needs_squash(values: &[f32]) -> bool {
    values
        .iter()
        .take(SQUASH_SAMPLE)
        .any(|v| !PROBABILITY_RANGE.contains(v))
}

fn sigmoid(v: f32) -> f32 {
    1.0 / (1.0 + (-v).exp())
}

/// Squash if needed, min-max stretch to bytes and resample to `width x height`.
///
/// A flat map carries no contrast to stretch; it becomes fully opaque at or above 0.5 and fully
/// transparent below.
pub(crate) fn mask_to_alpha(mask: MaskTensor, width: u32, height: u32) -> CutframeResult<GrayImage> {
    let MaskTensor {
        mut values,
        width: mw,
        height: mh,
    } = mask;

    if needs_squash(&values) {
        tracing::warn!("mask values outside [0, 1], applying logistic squash");
        for v in &mut values {
            *v = sigmoid(*v);
        }
    }

    let (min, max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let bytes: Vec<u8> = if range.is_finite() && range > f32::EPSILON {
        values
            .iter()
            .map(|&v| (((v - min) / range) * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    } else {
        let fill = if min >= 0.5 { 255 } else { 0 };
        vec![fill; values.len()]
    };

    let gray = GrayImage::from_raw(mw as u32, mh as u32, bytes)
        .ok_or_else(|| CutframeError::inference_run("mask does not match its shape"))?;
    if (mw as u32, mh as u32) == (width, height) {
        return Ok(gray);
    }
    Ok(image::imageops::resize(&gray, width, height, FilterType::Triangle))
}

#[cfg(test)]
#[path = "../../tests/unit/segment/pipeline.rs"]
mod tests;
