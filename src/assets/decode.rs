use anyhow::Context;

use crate::foundation::core::ImageRgba8;
use crate::foundation::error::{CutframeError, CutframeResult};

/// Decode any raster format the `image` crate understands.
pub fn decode_dynamic(bytes: &[u8]) -> CutframeResult<image::DynamicImage> {
    image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| CutframeError::decode(format!("{e:#}")))
}

/// Decode into a straight-alpha RGBA8 buffer.
pub fn decode_image(bytes: &[u8]) -> CutframeResult<ImageRgba8> {
    let rgba = decode_dynamic(bytes)?.to_rgba8();
    Ok(ImageRgba8::from_image(rgba))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
