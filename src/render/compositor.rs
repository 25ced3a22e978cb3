//! Dual-mode compositor.
//!
//! Preview and export run the exact same pass sequence; they differ only in the resolution cap
//! and in the export-only watermark, so a preview is a faithful downscale of the export.
//!
//! Pass order:
//! 1. layers below the subject, stretched to the output size
//! 2. subject buffer: mask replay, then adjustments
//! 3. shadow silhouette, offset by the upscaled shadow offset, blurred in output pixels
//! 4. subject at its transform times the upscale ratio
//! 5. layers above the subject
//! 6. watermark (export only)
//!
//! Every pass draws into its own fresh surface which is then composited over the frame, so no
//! opacity or blend state can leak from one pass into the next.

use std::sync::Arc;

use crate::assets::layers::LayerSource;
use crate::config::EngineConfig;
use crate::effects::adjust::apply_adjustments_in_place;
use crate::effects::blur::blur_rgba8_premul;
use crate::effects::composite::over_in_place;
use crate::effects::shadow::silhouette;
use crate::encode::still::{EncodedImage, encode_jpeg};
use crate::foundation::core::{Affine, Canvas, ImageRgba8};
use crate::foundation::error::CutframeResult;
use crate::mask::replay::replay_strokes;
use crate::render::FrameRGBA;
use crate::render::raster::{draw_image, image_paint, render_scene};
use crate::render::watermark;
use crate::scene::request::{RenderMode, RenderRequest};
use crate::scene::theme::Layer;

/// Output size for a `native` canvas under a longest-edge `cap`: `round(native * min(1, cap / max))`.
pub fn output_canvas(native: Canvas, cap: u32) -> Canvas {
    let factor = (f64::from(cap) / f64::from(native.max_dim().max(1))).min(1.0);
    native.scaled(factor)
}

/// What [`Compositor::render`] hands back.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOutput {
    /// Live premultiplied frame.
    Preview(FrameRGBA),
    /// Flattened lossy image.
    Export(EncodedImage),
}

/// Composes render requests against a layer source.
#[derive(Clone)]
pub struct Compositor {
    config: EngineConfig,
    layers: Arc<dyn LayerSource>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor reading decorative layers from `layers`.
    pub fn new(config: EngineConfig, layers: Arc<dyn LayerSource>) -> Self {
        Self { config, layers }
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Longest-edge cap for `mode`.
    pub fn cap(&self, mode: RenderMode) -> u32 {
        match mode {
            RenderMode::Preview => self.config.preview_max_dim,
            RenderMode::Export => self.config.export_max_dim,
        }
    }

    /// Output size of a request in `mode` for a theme of `native` size.
    pub fn output_canvas(&self, native: Canvas, mode: RenderMode) -> Canvas {
        output_canvas(native, self.cap(mode))
    }

    /// Produce the premultiplied frame for `req`.
    #[tracing::instrument(skip_all, fields(mode = ?req.mode))]
    pub fn compose(&self, req: &RenderRequest<'_>) -> CutframeResult<FrameRGBA> {
        req.validate()?;
        let theme = req.theme;
        let out = self.output_canvas(theme.native, req.mode);
        let (w, h) = (out.width, out.height);
        let stage = req.stage.unwrap_or(out);
        let ratio = f64::from(w) / f64::from(stage.width);
        tracing::debug!(width = w, height = h, ratio, "composing frame");

        let mut frame = vec![0u8; (w as usize) * (h as usize) * 4];

        self.draw_layers(&mut frame, &theme.layers_below(), out, req.strict_layers)?;

        let mut subject = replay_strokes(req.subject, req.strokes)?;
        apply_adjustments_in_place(&mut subject, &req.adjustments);
        let placement = req.transform.to_output_affine(ratio);

        let shadow = theme.shadow.params();
        if theme.shadow.enabled && shadow.opacity > 0.0 {
            let sil = silhouette(&subject)?;
            let at = Affine::translate(shadow.offset * ratio) * placement;
            let layer = draw_pass(&sil, out, at)?;
            // Blur is already in output pixels; it is never scaled by `ratio`.
            let layer = if shadow.blur > 0.0 {
                blur_rgba8_premul(&layer, w, h, shadow.blur as f32)?
            } else {
                layer
            };
            over_in_place(&mut frame, &layer, shadow.opacity as f32)?;
        }

        let layer = draw_pass(&subject, out, placement)?;
        over_in_place(&mut frame, &layer, 1.0)?;

        self.draw_layers(&mut frame, &theme.layers_above(), out, req.strict_layers)?;

        if req.mode == RenderMode::Export {
            watermark::stamp(&mut frame, w, h, &self.config.watermark_text)?;
        }

        Ok(FrameRGBA {
            width: w,
            height: h,
            data: frame,
            premultiplied: true,
        })
    }

    /// Compose and, in export mode, encode.
    pub fn render(&self, req: &RenderRequest<'_>) -> CutframeResult<RenderOutput> {
        let frame = self.compose(req)?;
        let out = match req.mode {
            RenderMode::Preview => RenderOutput::Preview(frame),
            RenderMode::Export => RenderOutput::Export(encode_jpeg(
                &frame,
                self.config.jpeg_quality,
                self.config.background_rgba,
            )?),
        };
        tracing::info!(mode = ?req.mode, "render complete");
        Ok(out)
    }

    fn draw_layers(
        &self,
        frame: &mut [u8],
        layers: &[&Layer],
        out: Canvas,
        strict: bool,
    ) -> CutframeResult<()> {
        for layer in layers {
            let img = match self.layers.load(&layer.image) {
                Ok(img) => img,
                Err(err) if strict => return Err(err),
                Err(err) => {
                    tracing::warn!(layer = %layer.image, error = %err, "skipping layer");
                    continue;
                }
            };
            let stretch = Affine::scale_non_uniform(
                f64::from(out.width) / f64::from(img.width),
                f64::from(out.height) / f64::from(img.height),
            );
            let pass = draw_pass(&img, out, stretch)?;
            over_in_place(frame, &pass, 1.0)?;
        }
        Ok(())
    }
}

/// Draw a straight-alpha image through `transform` onto a fresh transparent `out`-sized surface.
fn draw_pass(img: &ImageRgba8, out: Canvas, transform: Affine) -> CutframeResult<Vec<u8>> {
    let paint = image_paint(&img.to_premul(), img.width, img.height)?;
    render_scene(out.width, out.height, |ctx| {
        draw_image(ctx, paint, img.width, img.height, transform);
        Ok(())
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
