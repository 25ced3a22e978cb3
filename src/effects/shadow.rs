//! Drop-shadow synthesis: a solid silhouette plus a polar offset.

use serde::{Deserialize, Serialize};

use vello_cpu::peniko::{BlendMode, Compose, Mix};

use crate::foundation::core::{Affine, ImageRgba8, Vec2};
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::raster::{draw_image, image_paint, render_scene};

/// Straight RGBA used to flood the silhouette.
pub const SILHOUETTE_RGBA: [u8; 4] = [0, 0, 0, 255];

/// Theme-level shadow settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Whether a shadow is drawn at all.
    pub enabled: bool,
    /// Direction of the offset in degrees (0 = +x, 90 = +y).
    pub angle: f64,
    /// Offset length in editing-stage pixels.
    pub distance: f64,
    /// Gaussian standard deviation in output pixels.
    pub blur: f64,
    /// Shadow opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            angle: 90.0,
            distance: 12.0,
            blur: 10.0,
            opacity: 0.35,
        }
    }
}

/// Resolved shadow drawing parameters. All zero when the shadow is disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShadowParams {
    /// Offset in editing-stage pixels.
    pub offset: Vec2,
    /// Blur standard deviation in output pixels.
    pub blur: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl ShadowConfig {
    /// Check ranges.
    pub fn validate(&self) -> CutframeResult<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(CutframeError::validation("shadow opacity must be in [0, 1]"));
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(CutframeError::validation("shadow blur must be >= 0"));
        }
        if !self.angle.is_finite() || !self.distance.is_finite() {
            return Err(CutframeError::validation("shadow angle/distance must be finite"));
        }
        Ok(())
    }

    /// Resolve into drawing parameters.
    pub fn params(&self) -> ShadowParams {
        if !self.enabled {
            return ShadowParams::default();
        }
        ShadowParams {
            offset: shadow_offset(self.angle, self.distance),
            blur: self.blur.max(0.0),
            opacity: self.opacity.clamp(0.0, 1.0),
        }
    }
}

/// Polar to cartesian: `(cos(angle) * distance, sin(angle) * distance)`.
pub fn shadow_offset(angle_deg: f64, distance: f64) -> Vec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Vec2::new(cos * distance, sin * distance)
}

/// Solid silhouette sharing the alpha footprint of `src`.
///
/// One raster pass: `src` is drawn onto a blank surface, then a [`SILHOUETTE_RGBA`] flood is
/// composited source-in over it, so only the existing footprint takes the color and edge alpha
/// carries over.
pub fn silhouette(src: &ImageRgba8) -> CutframeResult<ImageRgba8> {
    let (w, h) = (src.width, src.height);
    let paint = image_paint(&src.to_premul(), w, h)?;
    let [r, g, b, a] = SILHOUETTE_RGBA;
    let mut bytes = render_scene(w, h, |ctx| {
        draw_image(ctx, paint, w, h, Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.push_blend_layer(BlendMode::new(Mix::Normal, Compose::SrcIn));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
        ctx.pop_layer();
        Ok(())
    })?;
    unpremultiply_rgba8_in_place(&mut bytes);
    ImageRgba8::from_raw(w, h, bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/shadow.rs"]
mod tests;
