use crate::foundation::core::{Canvas, SubjectTransform, Vec2};
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::scene::theme::{Anchor, FractionalBox};

/// Fit a subject of `natural` size into the placement box on a `stage`-sized surface.
///
/// The fit-scale is `min(boxW / naturalW, boxH / naturalH)`, applied to both axes. The box
/// rotation turns the fitted subject about the box center. Call once per (theme, subject) pair.
#[tracing::instrument(level = "debug")]
pub fn initial_transform(
    placement: &FractionalBox,
    stage: Canvas,
    natural: Canvas,
) -> CutframeResult<SubjectTransform> {
    if stage.width == 0 || stage.height == 0 {
        return Err(CutframeError::validation("stage dimensions must be > 0"));
    }
    if natural.width == 0 || natural.height == 0 {
        return Err(CutframeError::validation("subject dimensions must be > 0"));
    }

    let p = placement;
    let (stage_w, stage_h) = (f64::from(stage.width), f64::from(stage.height));
    let (nat_w, nat_h) = (f64::from(natural.width), f64::from(natural.height));

    let box_w = p.width * stage_w;
    let box_h = p.height * stage_h;
    let center = Vec2::new(p.x * stage_w + box_w / 2.0, p.y * stage_h + box_h / 2.0);

    let fit = fit_scale(box_w, box_h, nat_w, nat_h);
    let (fit_w, fit_h) = (nat_w * fit, nat_h * fit);

    let top_left = Vec2::new(
        -fit_w / 2.0,
        match p.anchor {
            Anchor::Top => -box_h / 2.0,
            Anchor::Center => -fit_h / 2.0,
            Anchor::Bottom => box_h / 2.0 - fit_h,
        },
    );
    let (sin, cos) = p.rotation.to_radians().sin_cos();
    let rotated = Vec2::new(
        top_left.x * cos - top_left.y * sin,
        top_left.x * sin + top_left.y * cos,
    );

    let out = SubjectTransform {
        x: center.x + rotated.x,
        y: center.y + rotated.y,
        scale_x: fit,
        scale_y: fit,
        rotation: p.rotation,
    };
    out.validate()?;
    Ok(out)
}

/// Largest isotropic scale that keeps a `nat_w x nat_h` subject inside a `box_w x box_h` box.
pub fn fit_scale(box_w: f64, box_h: f64, nat_w: f64, nat_h: f64) -> f64 {
    (box_w / nat_w).min(box_h / nat_h)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/placement.rs"]
mod tests;
