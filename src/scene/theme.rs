//! Theme descriptor: the read-only scene template the engine renders into.

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::effects::adjust::Adjustments;
use crate::effects::shadow::ShadowConfig;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CutframeError, CutframeResult};

/// Vertical alignment of the fitted subject inside the placement box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Top edges aligned.
    Top,
    /// Centered on both axes.
    #[default]
    Center,
    /// Bottom edges aligned.
    Bottom,
}

/// The placement box as authored in a theme file.
///
/// Legacy themes express the four box fields as percentages. [`PlacementBox::normalize`] turns
/// either encoding into a [`FractionalBox`]; themes only ever hold the normalized form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Initial subject rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Vertical anchor.
    #[serde(default)]
    pub anchor: Anchor,
}

impl PlacementBox {
    /// Return `true` when any of the four box fields exceeds 1 (percentage encoding).
    pub fn is_legacy_percent(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .any(|&v| v > 1.0)
    }

    /// Fractional form of this box. Percentages are divided by 100 across all four fields.
    pub fn normalize(&self) -> FractionalBox {
        let div = if self.is_legacy_percent() { 100.0 } else { 1.0 };
        FractionalBox {
            x: self.x / div,
            y: self.y / div,
            width: self.width / div,
            height: self.height / div,
            rotation: self.rotation,
            anchor: self.anchor,
        }
    }
}

/// Where the subject goes, as fractions of the canvas.
///
/// Deserializes through [`PlacementBox::normalize`], so the percentage branch runs exactly once,
/// at ingestion. Serializes back to a form that re-ingests to the same box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PlacementBox", into = "PlacementBox")]
pub struct FractionalBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Initial subject rotation in degrees.
    pub rotation: f64,
    /// Vertical anchor.
    pub anchor: Anchor,
}

impl Default for FractionalBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            rotation: 0.0,
            anchor: Anchor::Center,
        }
    }
}

impl From<PlacementBox> for FractionalBox {
    fn from(raw: PlacementBox) -> Self {
        raw.normalize()
    }
}

impl From<FractionalBox> for PlacementBox {
    fn from(b: FractionalBox) -> Self {
        // A fraction above 1 would read back as a percentage; write percentages instead.
        let mul = if [b.x, b.y, b.width, b.height].iter().any(|&v| v > 1.0) {
            100.0
        } else {
            1.0
        };
        Self {
            x: b.x * mul,
            y: b.y * mul,
            width: b.width * mul,
            height: b.height * mul,
            rotation: b.rotation,
            anchor: b.anchor,
        }
    }
}

/// One decorative image in the scene stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Reference resolved by a [`crate::LayerSource`].
    pub image: String,
    /// Stacking order; lower draws first.
    pub z_index: i32,
    /// Hidden layers are never drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// The scene template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Native resolution of the template.
    pub native: Canvas,
    /// Decorative layers, in any order.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Stacking position of the subject.
    pub subject_z_index: i32,
    /// Placement box, normalized at ingestion.
    pub placement: FractionalBox,
    /// Drop shadow settings.
    #[serde(default)]
    pub shadow: ShadowConfig,
    /// Adjustment bundle new sessions start with.
    #[serde(default)]
    pub default_adjustments: Adjustments,
}

impl Theme {
    /// Parse a theme from JSON and validate it.
    pub fn from_json_str(s: &str) -> CutframeResult<Self> {
        let theme: Self = serde_json::from_str(s)
            .map_err(|e| CutframeError::validation(format!("invalid theme json: {e}")))?;
        theme.validate()?;
        Ok(theme)
    }

    /// Read and parse a theme file.
    pub fn from_path(path: impl AsRef<Path>) -> CutframeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read theme '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> CutframeResult<()> {
        Canvas::new(self.native.width, self.native.height)?;
        if let Some(clash) = self
            .layers
            .iter()
            .find(|l| l.z_index == self.subject_z_index)
        {
            return Err(CutframeError::validation(format!(
                "layer '{}' shares the subject z-index {}",
                clash.image, self.subject_z_index
            )));
        }
        let p = &self.placement;
        if [p.x, p.y, p.width, p.height]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(CutframeError::validation(
                "placement box fields must be finite and >= 0",
            ));
        }
        if p.width == 0.0 || p.height == 0.0 {
            return Err(CutframeError::validation("placement box must have area"));
        }
        self.shadow.validate()?;
        Ok(())
    }

    /// Visible layers drawn before the subject, in z order.
    pub fn layers_below(&self) -> Vec<&Layer> {
        self.sorted_visible(|z| z < self.subject_z_index)
    }

    /// Visible layers drawn after the subject, in z order.
    pub fn layers_above(&self) -> Vec<&Layer> {
        self.sorted_visible(|z| z > self.subject_z_index)
    }

    fn sorted_visible(&self, keep: impl Fn(i32) -> bool) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self
            .layers
            .iter()
            .filter(|l| l.visible && keep(l.z_index))
            .collect();
        out.sort_by_key(|l| l.z_index);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/theme.rs"]
mod tests;
