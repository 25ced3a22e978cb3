//! Still-image output: flattened JPEG for exports, PNG for cut-outs and preview frames.

use std::io::Cursor;

use image::ImageEncoder as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;

use crate::effects::composite::over;
use crate::foundation::core::ImageRgba8;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};
use crate::render::FrameRGBA;

/// Container format of an [`EncodedImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy, opaque.
    Jpeg,
    /// Lossless, alpha kept.
    Png,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// Encoded bytes plus the pixel dimensions they decode to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container format.
    pub format: OutputFormat,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Composite a premultiplied frame over a straight-alpha background and drop alpha.
pub(crate) fn flatten_rgb(frame: &FrameRGBA, background: [u8; 4]) -> Vec<u8> {
    let mut bg = background;
    premultiply_rgba8_in_place(&mut bg);

    let mut rgba = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(4) {
        let mut src = [px[0], px[1], px[2], px[3]];
        if !frame.premultiplied {
            premultiply_rgba8_in_place(&mut src);
        }
        rgba.extend_from_slice(&over(bg, src, 1.0));
    }
    unpremultiply_rgba8_in_place(&mut rgba);

    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}

fn check_frame(frame: &FrameRGBA) -> CutframeResult<()> {
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.width == 0 || frame.height == 0 || frame.data.len() != expected {
        return Err(CutframeError::encode(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        )));
    }
    Ok(())
}

/// Flatten over `background` and encode as baseline JPEG at `quality` (1..=100).
pub fn encode_jpeg(
    frame: &FrameRGBA,
    quality: u8,
    background: [u8; 4],
) -> CutframeResult<EncodedImage> {
    check_frame(frame)?;
    if !(1..=100).contains(&quality) {
        return Err(CutframeError::encode(format!(
            "jpeg quality {quality} outside 1..=100"
        )));
    }
    let rgb = flatten_rgb(frame, background);

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| CutframeError::encode(format!("jpeg: {e}")))?;

    Ok(EncodedImage {
        width: frame.width,
        height: frame.height,
        format: OutputFormat::Jpeg,
        bytes,
    })
}

fn png_bytes(straight_rgba: &[u8], width: u32, height: u32) -> CutframeResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    PngEncoder::new(&mut cursor)
        .write_image(
            straight_rgba,
            width,
            height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| CutframeError::encode(format!("png: {e}")))?;
    Ok(cursor.into_inner())
}

/// Encode a frame as PNG, keeping alpha.
pub fn encode_png(frame: &FrameRGBA) -> CutframeResult<EncodedImage> {
    check_frame(frame)?;
    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }
    Ok(EncodedImage {
        width: frame.width,
        height: frame.height,
        format: OutputFormat::Png,
        bytes: png_bytes(&rgba, frame.width, frame.height)?,
    })
}

/// Encode a straight-alpha image (for example a segmentation cut-out) as PNG.
pub fn encode_png_image(img: &ImageRgba8) -> CutframeResult<EncodedImage> {
    Ok(EncodedImage {
        width: img.width,
        height: img.height,
        format: OutputFormat::Png,
        bytes: png_bytes(&img.data, img.width, img.height)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/still.rs"]
mod tests;
