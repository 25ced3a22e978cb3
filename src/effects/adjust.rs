//! Per-pixel photographic adjustment.
//!
//! The stage order is fixed: brightness, contrast, vibrance, warmth, then clamp and round.
//! Reordering changes the output.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::foundation::core::ImageRgba8;

/// Inclusive bounds for one adjustment parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ParamRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `v` into the range, mapping NaN to zero.
    pub fn clamp(self, v: f64) -> f64 {
        if v.is_nan() {
            return 0.0;
        }
        v.clamp(self.min, self.max)
    }
}

/// Nominal and UI-enforced ranges for the four parameters.
pub mod ranges {
    use super::ParamRange;

    /// Brightness, as a fraction of full scale added to each channel.
    pub const BRIGHTNESS: ParamRange = ParamRange::new(-1.0, 1.0);
    /// Contrast, in percent.
    pub const CONTRAST: ParamRange = ParamRange::new(-100.0, 100.0);
    /// Vibrance (saturation push away from the pixel mean).
    pub const VIBRANCE: ParamRange = ParamRange::new(-1.0, 1.0);
    /// Warmth, in 5 % steps of red gain / blue cut.
    pub const WARMTH: ParamRange = ParamRange::new(-10.0, 10.0);

    /// Slider bounds exposed to users.
    pub const UI_BRIGHTNESS: ParamRange = ParamRange::new(-0.3, 0.3);
    /// Slider bounds exposed to users.
    pub const UI_CONTRAST: ParamRange = ParamRange::new(-30.0, 30.0);
    /// Slider bounds exposed to users.
    pub const UI_VIBRANCE: ParamRange = ParamRange::new(-0.5, 0.5);
    /// Slider bounds exposed to users.
    pub const UI_WARMTH: ParamRange = ParamRange::new(-5.0, 5.0);
}

/// Brightness, contrast, vibrance and warmth. The zero bundle is the identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustments {
    /// Added to each of R, G, B as `brightness * 255`.
    pub brightness: f64,
    /// Percentage contrast change around mid-grey.
    pub contrast: f64,
    /// Saturation push relative to the channel mean.
    pub vibrance: f64,
    /// Red gain and blue cut of `warmth * 5 %`.
    pub warmth: f64,
}

impl Adjustments {
    /// All-zero bundle.
    pub const IDENTITY: Self = Self {
        brightness: 0.0,
        contrast: 0.0,
        vibrance: 0.0,
        warmth: 0.0,
    };

    /// Return `true` when applying this bundle cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Clamp every parameter to its nominal range.
    pub fn clamped(self) -> Self {
        Self {
            brightness: ranges::BRIGHTNESS.clamp(self.brightness),
            contrast: ranges::CONTRAST.clamp(self.contrast),
            vibrance: ranges::VIBRANCE.clamp(self.vibrance),
            warmth: ranges::WARMTH.clamp(self.warmth),
        }
    }

    /// Clamp every parameter to the narrower slider range.
    pub fn clamped_to_ui(self) -> Self {
        Self {
            brightness: ranges::UI_BRIGHTNESS.clamp(self.brightness),
            contrast: ranges::UI_CONTRAST.clamp(self.contrast),
            vibrance: ranges::UI_VIBRANCE.clamp(self.vibrance),
            warmth: ranges::UI_WARMTH.clamp(self.warmth),
        }
    }

    fn contrast_factor(&self) -> f64 {
        if self.contrast == 0.0 {
            return 1.0;
        }
        ((100.0 + self.contrast) / 100.0).max(0.0)
    }
}

/// Named adjustment bundles. Selecting one assigns its bundle wholesale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// All zeros.
    Original,
    /// Punchier color and contrast.
    Vivid,
    /// Warm cast with a little lift.
    Warm,
    /// Cool cast.
    Cool,
    /// Strong contrast, slightly darker.
    Dramatic,
    /// Lifted and flattened.
    Faded,
    /// Fully desaturated.
    Mono,
}

impl Preset {
    /// Every preset, in display order.
    pub const ALL: [Preset; 7] = [
        Preset::Original,
        Preset::Vivid,
        Preset::Warm,
        Preset::Cool,
        Preset::Dramatic,
        Preset::Faded,
        Preset::Mono,
    ];

    /// The fixed bundle for this preset.
    pub fn bundle(self) -> Adjustments {
        let (brightness, contrast, vibrance, warmth) = match self {
            Preset::Original => (0.0, 0.0, 0.0, 0.0),
            Preset::Vivid => (0.02, 12.0, 0.35, 0.0),
            Preset::Warm => (0.03, 5.0, 0.1, 3.0),
            Preset::Cool => (0.0, 5.0, 0.05, -3.0),
            Preset::Dramatic => (-0.05, 25.0, 0.15, 0.0),
            Preset::Faded => (0.08, -20.0, -0.25, 1.0),
            Preset::Mono => (0.0, 10.0, -1.0, 0.0),
        };
        Adjustments {
            brightness,
            contrast,
            vibrance,
            warmth,
        }
    }

    /// Stable lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Original => "original",
            Preset::Vivid => "vivid",
            Preset::Warm => "warm",
            Preset::Cool => "cool",
            Preset::Dramatic => "dramatic",
            Preset::Faded => "faded",
            Preset::Mono => "mono",
        }
    }

    /// Look a preset up by [`Preset::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// Apply `adj` to a copy of `src`.
pub fn apply_adjustments(src: &ImageRgba8, adj: &Adjustments) -> ImageRgba8 {
    let mut out = src.clone();
    apply_adjustments_in_place(&mut out, adj);
    out
}

/// Apply `adj` in place. Fully transparent pixels are left untouched.
pub fn apply_adjustments_in_place(img: &mut ImageRgba8, adj: &Adjustments) {
    if adj.is_identity() {
        return;
    }
    let adj = *adj;
    img.data
        .par_chunks_exact_mut(4)
        .for_each(|px| adjust_px(px, &adj));
}

fn adjust_px(px: &mut [u8], adj: &Adjustments) {
    if px[3] == 0 {
        return;
    }
    let mut r = f64::from(px[0]);
    let mut g = f64::from(px[1]);
    let mut b = f64::from(px[2]);

    let lift = adj.brightness * 255.0;
    r += lift;
    g += lift;
    b += lift;

    let factor = adj.contrast_factor();
    let contrast = |v: f64| ((v / 255.0 - 0.5) * factor + 0.5) * 255.0;
    r = contrast(r);
    g = contrast(g);
    b = contrast(b);

    if adj.vibrance != 0.0 {
        let avg = (r + g + b) / 3.0;
        r += (r - avg) * adj.vibrance;
        g += (g - avg) * adj.vibrance;
        b += (b - avg) * adj.vibrance;
    }

    if adj.warmth != 0.0 {
        r *= 1.0 + adj.warmth * 0.05;
        b *= 1.0 - adj.warmth * 0.05;
    }

    px[0] = to_channel(r);
    px[1] = to_channel(g);
    px[2] = to_channel(b);
}

fn to_channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/effects/adjust.rs"]
mod tests;
