//! Editing session: the mutable state one user edits between renders.

use std::sync::Arc;

use crate::effects::adjust::{Adjustments, Preset};
use crate::foundation::core::{Canvas, ImageRgba8, Point, SubjectTransform};
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::mask::stroke::{MaskHistory, MaskStroke, PaintMode, StrokeRecorder};
use crate::scene::placement::initial_transform;
use crate::scene::request::{EditDocument, RenderMode, RenderRequest};
use crate::scene::theme::Theme;

/// Owns the subject, its transform, the adjustment bundle and the mask log for one theme.
///
/// The compositor only ever borrows this state through [`EditSession::render_request`].
#[derive(Clone, Debug)]
pub struct EditSession {
    theme: Arc<Theme>,
    stage: Canvas,
    subject: Option<Arc<ImageRgba8>>,
    transform: Option<SubjectTransform>,
    adjustments: Adjustments,
    masks: MaskHistory,
    stroke: Option<StrokeRecorder>,
}

impl EditSession {
    /// Empty session on `theme`, edited on a `stage`-sized surface.
    pub fn new(theme: Arc<Theme>, stage: Canvas) -> CutframeResult<Self> {
        Canvas::new(stage.width, stage.height)?;
        let adjustments = theme.default_adjustments;
        Ok(Self {
            theme,
            stage,
            subject: None,
            transform: None,
            adjustments,
            masks: MaskHistory::new(),
            stroke: None,
        })
    }

    /// Scene template.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Editing-stage size.
    pub fn stage(&self) -> Canvas {
        self.stage
    }

    /// Current cut-out, if one is loaded.
    pub fn subject(&self) -> Option<&ImageRgba8> {
        self.subject.as_deref()
    }

    /// Current transform, if a subject is loaded.
    pub fn transform(&self) -> Option<SubjectTransform> {
        self.transform
    }

    /// Current adjustment bundle.
    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    /// Recorded strokes.
    pub fn masks(&self) -> &MaskHistory {
        &self.masks
    }

    /// Replace the subject. Discards the mask log and seeds a fresh placement.
    #[tracing::instrument(level = "debug", skip_all, fields(width = subject.width, height = subject.height))]
    pub fn load_subject(&mut self, subject: ImageRgba8) -> CutframeResult<SubjectTransform> {
        let natural = Canvas::new(subject.width, subject.height)?;
        let transform = initial_transform(&self.theme.placement, self.stage, natural)?;
        self.subject = Some(Arc::new(subject));
        self.masks.clear();
        self.stroke = None;
        self.transform = Some(transform);
        Ok(transform)
    }

    /// Apply a drag/resize/rotate result.
    pub fn set_transform(&mut self, transform: SubjectTransform) -> CutframeResult<()> {
        if self.subject.is_none() {
            return Err(CutframeError::validation("no subject loaded"));
        }
        transform.validate()?;
        self.transform = Some(transform);
        Ok(())
    }

    /// Put the subject back at its initial placement. Strokes are kept; they live in native space.
    pub fn reset_transform(&mut self) -> CutframeResult<SubjectTransform> {
        let subject = self
            .subject
            .as_ref()
            .ok_or_else(|| CutframeError::validation("no subject loaded"))?;
        let natural = Canvas::new(subject.width, subject.height)?;
        let transform = initial_transform(&self.theme.placement, self.stage, natural)?;
        self.transform = Some(transform);
        Ok(transform)
    }

    /// Set adjustments from the sliders, clamped to the slider ranges.
    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments.clamped_to_ui();
    }

    /// Assign a preset bundle wholesale.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.adjustments = preset.bundle();
    }

    fn current_transform(&self) -> CutframeResult<SubjectTransform> {
        self.transform
            .ok_or_else(|| CutframeError::validation("no subject loaded"))
    }

    /// Start a stroke at stage point `at`. An unfinished stroke is discarded.
    pub fn begin_stroke(
        &mut self,
        at: Point,
        brush_radius: f64,
        mode: PaintMode,
    ) -> CutframeResult<()> {
        if !brush_radius.is_finite() || brush_radius <= 0.0 {
            return Err(CutframeError::validation("brush radius must be > 0"));
        }
        let transform = self.current_transform()?;
        self.stroke = Some(StrokeRecorder::begin(&transform, at, brush_radius, mode));
        Ok(())
    }

    /// Add a stage-space sample to the stroke in progress. Ignored when no stroke is active.
    pub fn extend_stroke(&mut self, at: Point) {
        let Some(transform) = self.transform else {
            return;
        };
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.extend(&transform, at);
        }
    }

    /// Commit the stroke in progress to the mask log. A stroke with no usable samples is dropped.
    pub fn end_stroke(&mut self) -> Option<&MaskStroke> {
        let stroke = self.stroke.take()?.finish();
        if stroke.points.is_empty() {
            return None;
        }
        self.masks.push(stroke);
        self.masks.strokes().last()
    }

    /// Remove the most recent stroke.
    pub fn undo(&mut self) -> Option<MaskStroke> {
        self.masks.undo()
    }

    /// Remove every stroke.
    pub fn clear_masks(&mut self) {
        self.stroke = None;
        self.masks.clear();
    }

    /// Snapshot the current state as a render request.
    pub fn render_request(&self, mode: RenderMode) -> CutframeResult<RenderRequest<'_>> {
        let subject = self
            .subject
            .as_deref()
            .ok_or_else(|| CutframeError::validation("no subject loaded"))?;
        let transform = self.current_transform()?;
        Ok(RenderRequest::new(&self.theme, subject, transform)
            .with_adjustments(self.adjustments)
            .with_strokes(self.masks.strokes())
            .with_mode(mode)
            .with_stage(self.stage))
    }

    /// Serializable editing state.
    pub fn document(&self) -> EditDocument {
        EditDocument {
            transform: self.transform,
            adjustments: self.adjustments,
            strokes: self.masks.strokes().to_vec(),
            stage: Some(self.stage),
        }
    }

    /// Restore a saved editing state on top of the loaded subject.
    ///
    /// A document without a transform keeps the current placement; a document with a different
    /// stage size switches the session to it. Nothing changes unless the whole document is valid.
    pub fn apply_document(&mut self, doc: EditDocument) -> CutframeResult<()> {
        if self.subject.is_none() {
            return Err(CutframeError::validation("no subject loaded"));
        }
        let stage = match doc.stage {
            Some(stage) => Canvas::new(stage.width, stage.height)?,
            None => self.stage,
        };
        if let Some(t) = doc.transform {
            t.validate()?;
        }

        self.stage = stage;
        if doc.transform.is_some() {
            self.transform = doc.transform;
        }
        self.adjustments = doc.adjustments.clamped();
        self.masks = MaskHistory::from(doc.strokes);
        self.stroke = None;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/edit.rs"]
mod tests;
