use serde::{Deserialize, Serialize};

use crate::effects::adjust::Adjustments;
use crate::foundation::core::{Canvas, ImageRgba8, SubjectTransform};
use crate::foundation::error::CutframeResult;
use crate::mask::stroke::MaskStroke;
use crate::scene::theme::Theme;

/// Output fidelity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Interactive frame, capped at the preview resolution, no watermark.
    #[default]
    Preview,
    /// Final frame, capped at the export resolution, watermarked and lossy-encoded.
    Export,
}

/// Everything the compositor needs for one frame.
///
/// Borrowed so the session can issue a request per frame without cloning pixel buffers.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    /// Scene template.
    pub theme: &'a Theme,
    /// Edited-free cut-out; strokes and adjustments are applied during composition.
    pub subject: &'a ImageRgba8,
    /// Subject placement in editing-stage pixels.
    pub transform: SubjectTransform,
    /// Photographic adjustments applied after mask replay.
    pub adjustments: Adjustments,
    /// Mask log in subject-native space.
    pub strokes: &'a [MaskStroke],
    /// Output fidelity.
    pub mode: RenderMode,
    /// Editing-stage size the transform was authored against. `None` means output size.
    pub stage: Option<Canvas>,
    /// Fail the render when a decorative layer cannot be loaded instead of omitting it.
    pub strict_layers: bool,
}

impl<'a> RenderRequest<'a> {
    /// Request with identity adjustments, no strokes and the output size as stage.
    pub fn new(theme: &'a Theme, subject: &'a ImageRgba8, transform: SubjectTransform) -> Self {
        Self {
            theme,
            subject,
            transform,
            adjustments: Adjustments::default(),
            strokes: &[],
            mode: RenderMode::Preview,
            stage: None,
            strict_layers: false,
        }
    }

    /// Set the output mode.
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the editing-stage size.
    pub fn with_stage(mut self, stage: Canvas) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Set the adjustment bundle.
    pub fn with_adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Set the stroke log.
    pub fn with_strokes(mut self, strokes: &'a [MaskStroke]) -> Self {
        self.strokes = strokes;
        self
    }

    /// Toggle strict layer loading.
    pub fn strict(mut self, strict_layers: bool) -> Self {
        self.strict_layers = strict_layers;
        self
    }

    /// Reject non-finite transforms and empty surfaces.
    pub fn validate(&self) -> CutframeResult<()> {
        self.theme.validate()?;
        self.transform.validate()?;
        Canvas::new(self.subject.width, self.subject.height)?;
        if let Some(stage) = self.stage {
            Canvas::new(stage.width, stage.height)?;
        }
        Ok(())
    }
}

/// Serializable editing state: what a session would persist between renders.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditDocument {
    /// Current transform; `None` until placement has run.
    pub transform: Option<SubjectTransform>,
    /// Adjustment bundle.
    pub adjustments: Adjustments,
    /// Mask log.
    pub strokes: Vec<MaskStroke>,
    /// Editing-stage size the transform refers to.
    pub stage: Option<Canvas>,
}

impl EditDocument {
    /// Parse from JSON.
    pub fn from_json_str(s: &str) -> CutframeResult<Self> {
        serde_json::from_str(s).map_err(|e| {
            crate::foundation::error::CutframeError::validation(format!("invalid edit document: {e}"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/request.rs"]
mod tests;
