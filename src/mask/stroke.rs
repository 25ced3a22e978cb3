//! Mask stroke records and their projection from stage space into subject-native space.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, SubjectTransform};

/// What a stroke does to the subject's alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaintMode {
    /// Remove alpha along the stroke polyline.
    Erase,
    /// Reveal the original pixels inside the region the polyline encloses.
    Restore,
}

/// One brush stroke, stored in subject-native pixel space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskStroke {
    /// Polyline vertices.
    pub points: Vec<Point>,
    /// Brush radius.
    pub radius: f64,
    /// Paint mode.
    pub mode: PaintMode,
}

impl MaskStroke {
    /// On-screen radius under `transform`.
    pub fn apparent_radius(&self, transform: &SubjectTransform) -> f64 {
        self.radius * transform.radius_scale()
    }
}

/// Append-only stroke log. Undo pops the tail; there is no redo.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaskHistory {
    strokes: Vec<MaskStroke>,
}

impl MaskHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished stroke.
    pub fn push(&mut self, stroke: MaskStroke) {
        self.strokes.push(stroke);
    }

    /// Drop and return the most recent stroke.
    pub fn undo(&mut self) -> Option<MaskStroke> {
        self.strokes.pop()
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Strokes in recorded order.
    pub fn strokes(&self) -> &[MaskStroke] {
        &self.strokes
    }

    /// Number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// Return `true` when no strokes are recorded.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

impl From<Vec<MaskStroke>> for MaskHistory {
    fn from(strokes: Vec<MaskStroke>) -> Self {
        Self { strokes }
    }
}

/// Accumulates pointer samples for the stroke in progress.
///
/// Every sample is inverted through the transform current at the time it arrives, so the
/// finished stroke stays valid after later transform edits.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeRecorder {
    mode: PaintMode,
    radius: f64,
    points: Vec<Point>,
}

impl StrokeRecorder {
    /// Start a stroke at stage point `at` with an on-screen brush radius of `brush_radius`.
    pub fn begin(transform: &SubjectTransform, at: Point, brush_radius: f64, mode: PaintMode) -> Self {
        let scale = transform.radius_scale();
        let radius = if scale > 0.0 {
            brush_radius / scale
        } else {
            brush_radius
        };
        let mut recorder = Self {
            mode,
            radius,
            points: Vec::new(),
        };
        recorder.extend(transform, at);
        recorder
    }

    /// Add a stage-space sample. Samples that do not project to a finite point are dropped.
    pub fn extend(&mut self, transform: &SubjectTransform, at: Point) {
        let p = transform.stage_to_native(at);
        if p.x.is_finite() && p.y.is_finite() {
            self.points.push(p);
        }
    }

    /// Native-space points recorded so far.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Close the stroke.
    pub fn finish(self) -> MaskStroke {
        MaskStroke {
            points: self.points,
            radius: self.radius,
            mode: self.mode,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mask/stroke.rs"]
mod tests;
