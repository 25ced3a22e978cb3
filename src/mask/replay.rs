//! Replays a stroke log over the untouched cut-out.
//!
//! Every replay starts from the original pixels, so undo is just "replay one fewer stroke" and
//! the result never depends on which transform was active when a stroke was drawn.

use kurbo::{Cap, Circle, Join, Shape, Stroke, StrokeOpts};

use crate::foundation::core::{BezPath, ImageRgba8, Point};
use crate::foundation::error::CutframeResult;
use crate::foundation::math::mul_div255_u8;
use crate::mask::stroke::{MaskStroke, PaintMode};
use crate::render::raster::path_coverage;

const FLATTEN_TOLERANCE: f64 = 0.1;

/// Apply `strokes` in order to a fresh copy of `original` and return the edited cut-out.
///
/// Works on straight alpha: erase only lowers alpha, restore moves a pixel toward the original by
/// coverage, and pixels no stroke covers come back byte-identical.
#[tracing::instrument(level = "debug", skip_all, fields(strokes = strokes.len()))]
pub fn replay_strokes(original: &ImageRgba8, strokes: &[MaskStroke]) -> CutframeResult<ImageRgba8> {
    if strokes.is_empty() {
        return Ok(original.clone());
    }

    let (w, h) = (original.width, original.height);
    let mut current = original.data.clone();

    for stroke in strokes {
        match stroke.mode {
            PaintMode::Erase => {
                let outline = erase_outline(stroke);
                let cov = path_coverage(&outline, w, h)?;
                for (px, &c) in current.chunks_exact_mut(4).zip(cov.iter()) {
                    if c != 0 {
                        px[3] = mul_div255_u8(u16::from(px[3]), 255 - u16::from(c));
                    }
                }
            }
            PaintMode::Restore => {
                let Some(region) = restore_region(stroke) else {
                    continue;
                };
                let cov = path_coverage(&region, w, h)?;
                for ((px, src), &c) in current
                    .chunks_exact_mut(4)
                    .zip(original.data.chunks_exact(4))
                    .zip(cov.iter())
                {
                    match c {
                        0 => {}
                        255 => px.copy_from_slice(src),
                        _ => {
                            for (v, &s) in px.iter_mut().zip(src) {
                                *v = lerp_u8(*v, s, c);
                            }
                        }
                    }
                }
            }
        }
    }

    ImageRgba8::from_raw(w, h, current)
}

fn lerp_u8(from: u8, to: u8, t: u8) -> u8 {
    let (from, to) = (f32::from(from), f32::from(to));
    (from + (to - from) * f32::from(t) / 255.0)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn dedup_points(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_none_or(|last| *last != p) {
            out.push(p);
        }
    }
    out
}

/// Round-capped, round-joined band of width `2 * radius` along the polyline.
fn erase_outline(stroke: &MaskStroke) -> BezPath {
    let radius = stroke.radius;
    if !radius.is_finite() || radius <= 0.0 {
        return BezPath::new();
    }
    let points = dedup_points(&stroke.points);
    match points.as_slice() {
        [] => BezPath::new(),
        [p] => Circle::new(*p, radius).to_path(FLATTEN_TOLERANCE),
        [first, rest @ ..] => {
            let mut line = BezPath::new();
            line.move_to(*first);
            for p in rest {
                line.line_to(*p);
            }
            let style = Stroke::new(radius * 2.0)
                .with_caps(Cap::Round)
                .with_join(Join::Round);
            kurbo::stroke(line.iter(), &style, &StrokeOpts::default(), FLATTEN_TOLERANCE)
        }
    }
}

/// Closed polygon through the polyline; fewer than three distinct vertices enclose nothing.
fn restore_region(stroke: &MaskStroke) -> Option<BezPath> {
    let points = dedup_points(&stroke.points);
    if points.len() < 3 {
        return None;
    }
    let mut region = BezPath::new();
    region.move_to(points[0]);
    for p in &points[1..] {
        region.line_to(*p);
    }
    region.close_path();
    Some(region)
}

#[cfg(test)]
#[path = "../../tests/unit/mask/replay.rs"]
mod tests;
