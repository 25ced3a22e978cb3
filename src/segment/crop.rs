use crate::foundation::core::ImageRgba8;
use crate::foundation::error::CutframeResult;

/// Pixel rectangle inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropBox {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Tight box around pixels with alpha strictly above `threshold`, grown by `padding` and
/// clamped to the image. `None` when no pixel qualifies.
pub fn alpha_bounds(img: &ImageRgba8, threshold: u8, padding: u32) -> Option<CropBox> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (i, px) in img.data.chunks_exact(4).enumerate() {
        if px[3] <= threshold {
            continue;
        }
        let x = (i % img.width as usize) as u32;
        let y = (i / img.width as usize) as u32;
        found = true;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    if !found {
        return None;
    }

    let x0 = min_x.saturating_sub(padding);
    let y0 = min_y.saturating_sub(padding);
    let x1 = max_x.saturating_add(padding).min(img.width - 1);
    let y1 = max_y.saturating_add(padding).min(img.height - 1);
    Some(CropBox {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Copy out `area`, which must lie inside `img`.
pub fn crop(img: ImageRgba8, area: CropBox) -> CutframeResult<ImageRgba8> {
    let buf = img.into_image()?;
    let region = image::imageops::crop_imm(&buf, area.x, area.y, area.width, area.height);
    Ok(ImageRgba8::from_image(region.to_image()))
}

/// Crop to the padded alpha bounds, or return `img` unchanged when nothing clears `threshold`.
pub fn crop_to_alpha(img: ImageRgba8, threshold: u8, padding: u32) -> CutframeResult<ImageRgba8> {
    match alpha_bounds(&img, threshold, padding) {
        Some(area) if (area.width, area.height) != (img.width, img.height) => crop(img, area),
        _ => Ok(img),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/segment/crop.rs"]
mod tests;
