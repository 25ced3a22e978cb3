//! Bridges between crate geometry/pixel types and the `vello_cpu` rasterizer.

use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath};
use crate::foundation::error::{CutframeError, CutframeResult};

pub(crate) fn surface_dims(width: u32, height: u32) -> CutframeResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CutframeError::evaluation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CutframeError::evaluation("surface height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(CutframeError::evaluation("surface must be at least 1x1"));
    }
    Ok((w, h))
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CutframeResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CutframeError::evaluation("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Image paint over premultiplied bytes.
pub(crate) fn image_paint(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> CutframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Run one scene pass into a fresh transparent surface and return its premultiplied bytes.
pub(crate) fn render_scene(
    width: u32,
    height: u32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> CutframeResult<()>,
) -> CutframeResult<Vec<u8>> {
    let (w, h) = surface_dims(width, height)?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    draw(&mut ctx)?;
    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    pixmap.data_as_u8_slice_mut().fill(0);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

/// Draw a premultiplied image so its `width x height` rect maps through `transform`.
pub(crate) fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
    transform: Affine,
) {
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(width),
        f64::from(height),
    ));
}

/// Per-pixel coverage (0..=255) of `path` filled non-zero, in a `width x height` grid.
pub(crate) fn path_coverage(path: &BezPath, width: u32, height: u32) -> CutframeResult<Vec<u8>> {
    if path.elements().is_empty() {
        return Ok(vec![0; (width as usize) * (height as usize)]);
    }
    let bytes = render_scene(width, height, |ctx| {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&bezpath_to_cpu(path));
        Ok(())
    })?;
    Ok(bytes.chunks_exact(4).map(|px| px[3]).collect())
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
