use crate::foundation::error::{CutframeError, CutframeResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Pixel dimensions of a surface (theme native size, editing stage, output frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> CutframeResult<Self> {
        if width == 0 || height == 0 {
            return Err(CutframeError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Larger of the two dimensions.
    pub fn max_dim(self) -> u32 {
        self.width.max(self.height)
    }

    /// Scale both axes by `factor`, rounding to the nearest pixel and never collapsing to zero.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }
}

/// Straight (non-premultiplied) RGBA8 image, row-major and tightly packed.
///
/// This is the representation the segmentation pipeline, mask replay and adjustment filter work
/// on. Surfaces handed to the rasterizer are premultiplied at the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRgba8 {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, straight alpha.
    pub data: Vec<u8>,
}

impl ImageRgba8 {
    /// Fully transparent image of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    /// Wrap raw bytes, checking the buffer matches `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> CutframeResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| CutframeError::validation("image buffer size overflow"))?;
        if data.len() != expected {
            return Err(CutframeError::validation(format!(
                "image buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Dimensions as a [`Canvas`].
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Byte offset of pixel `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Read one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Overwrite one pixel.
    pub fn set_pixel(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let i = self.index(x, y);
        self.data[i..i + 4].copy_from_slice(&px);
    }

    /// Convert from an `image` crate buffer.
    pub fn from_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Convert into an `image` crate buffer.
    pub fn into_image(self) -> CutframeResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or_else(|| CutframeError::evaluation("image buffer does not match dimensions"))
    }

    /// Premultiplied copy of the pixel bytes.
    pub fn to_premul(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        crate::foundation::math::premultiply_rgba8_in_place(&mut out);
        out
    }
}

/// Placement of the subject on the editing stage.
///
/// Applied as translate, then rotate (degrees, about the subject origin), then scale. Owned by
/// the editing session; seeded once by [`crate::initial_transform`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectTransform {
    /// Stage-space x of the subject origin.
    pub x: f64,
    /// Stage-space y of the subject origin.
    pub y: f64,
    /// Horizontal scale.
    pub scale_x: f64,
    /// Vertical scale.
    pub scale_y: f64,
    /// Rotation in degrees, clockwise in y-down space.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for SubjectTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }
}

impl SubjectTransform {
    /// Subject-native to stage affine.
    pub fn to_affine(&self) -> Affine {
        Affine::translate((self.x, self.y))
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Subject-native to output affine, with every positional quantity multiplied by `ratio`.
    pub fn to_output_affine(&self, ratio: f64) -> Affine {
        Affine::scale(ratio) * self.to_affine()
    }

    /// Map a stage-space point back into subject-native space.
    ///
    /// Translate by the negative position, rotate by the negative angle, then divide by the
    /// (possibly anisotropic) scale.
    pub fn stage_to_native(&self, p: Point) -> Point {
        let v = Vec2::new(p.x - self.x, p.y - self.y);
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let rx = v.x * cos - v.y * sin;
        let ry = v.x * sin + v.y * cos;
        Point::new(rx / self.scale_x, ry / self.scale_y)
    }

    /// Scalar used to convert brush radii between stage and native space.
    pub fn radius_scale(&self) -> f64 {
        (self.scale_x.abs() + self.scale_y.abs()) / 2.0
    }

    /// Reject non-finite values and zero scale, which would make the transform non-invertible.
    pub fn validate(&self) -> CutframeResult<()> {
        let vals = [self.x, self.y, self.scale_x, self.scale_y, self.rotation];
        if vals.iter().any(|v| !v.is_finite()) {
            return Err(CutframeError::validation("subject transform must be finite"));
        }
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return Err(CutframeError::validation("subject scale must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
