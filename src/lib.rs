//! Cutframe places a cut-out subject photo into a templated scene and renders it.
//!
//! The engine covers:
//!
//! - [`Segmenter`]: photo to cropped transparent cut-out, through a shared [`SharedEngine`]
//! - [`initial_transform`]: fit a subject into a theme's placement box
//! - [`EditSession`]: transform, adjustment and mask-stroke state for one subject
//! - [`Compositor`]: preview and export frames from a [`RenderRequest`], with identical
//!   pass order so a preview is a faithful downscale of the export
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod config;
mod effects;
mod encode;
mod foundation;
mod mask;
mod render;
mod scene;
mod segment;
mod session;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, ImageRgba8, Point, Rect, SubjectTransform, Vec2,
};
pub use crate::foundation::error::{CutframeError, CutframeResult};

pub use crate::assets::decode::{decode_dynamic, decode_image};
pub use crate::assets::layers::{DirLayerSource, LayerSource, MemoryLayerSource, normalize_rel_path};
pub use crate::config::EngineConfig;
pub use crate::effects::adjust::{
    Adjustments, ParamRange, Preset, apply_adjustments, apply_adjustments_in_place, ranges,
};
pub use crate::effects::blur::blur_rgba8_premul;
pub use crate::effects::shadow::{
    SILHOUETTE_RGBA, ShadowConfig, ShadowParams, shadow_offset, silhouette,
};
pub use crate::encode::still::{
    EncodedImage, OutputFormat, encode_jpeg, encode_png, encode_png_image,
};
pub use crate::mask::replay::replay_strokes;
pub use crate::mask::stroke::{MaskHistory, MaskStroke, PaintMode, StrokeRecorder};
pub use crate::render::FrameRGBA;
pub use crate::render::compositor::{Compositor, RenderOutput, output_canvas};
pub use crate::scene::placement::{fit_scale, initial_transform};
pub use crate::scene::request::{EditDocument, RenderMode, RenderRequest};
pub use crate::scene::theme::{Anchor, FractionalBox, Layer, PlacementBox, Theme};
pub use crate::segment::crop::{CropBox, alpha_bounds, crop_to_alpha};
pub use crate::segment::engine::{
    BackendLoader, EngineHandle, InferenceBackend, MaskTensor, OrtBackend, OrtLoader,
    SharedEngine, global_engine,
};
pub use crate::segment::pipeline::{SegmentationResult, Segmenter};
pub use crate::session::edit::EditSession;
pub use crate::session::gate::{RenderGate, RenderTicket};
