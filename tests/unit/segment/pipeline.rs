use super::*;
use crate::segment::engine::{BackendLoader, InferenceBackend};

/// Returns a fixed mask regardless of input.
#[derive(Clone)]
struct FixedMask(MaskTensor);

impl InferenceBackend for FixedMask {
    fn infer(&mut self, input: Array4<f32>) -> CutframeResult<MaskTensor> {
        assert_eq!(input.shape()[..2], [1, 3]);
        assert!(input.iter().all(|v| (0.0..=1.0).contains(v)));
        Ok(self.0.clone())
    }
}

struct Failing;

impl InferenceBackend for Failing {
    fn infer(&mut self, _input: Array4<f32>) -> CutframeResult<MaskTensor> {
        Err(CutframeError::inference_run("kernel crashed"))
    }
}

enum Loader {
    Fixed(MaskTensor),
    FailingRun,
    FailingInit,
}

impl BackendLoader for Loader {
    fn load(&self) -> CutframeResult<Box<dyn InferenceBackend>> {
        match self {
            Loader::Fixed(m) => Ok(Box::new(FixedMask(m.clone()))),
            Loader::FailingRun => Ok(Box::new(Failing)),
            Loader::FailingInit => Err(CutframeError::inference_init("no runtime")),
        }
    }
}

fn block_mask(size: usize, lo: usize, hi: usize, inside: f32, outside: f32) -> MaskTensor {
    let mut values = vec![outside; size * size];
    for y in lo..hi {
        for x in lo..hi {
            values[y * size + x] = inside;
        }
    }
    MaskTensor::new(values, size, size).unwrap()
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(w, h, image::Rgba([30, 60, 90, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn segmenter(loader: Loader) -> Segmenter {
    let config = EngineConfig {
        working_max_dim: 40,
        model_input_size: 16,
        crop_padding: 1,
        ..EngineConfig::default()
    };
    Segmenter::new(Arc::new(SharedEngine::new(loader)), config)
}

#[test]
fn working_image_bounds_longest_side_and_keeps_aspect() {
    let photo = DynamicImage::new_rgba8(3000, 1500);
    let w = working_image(photo, 1536);
    assert_eq!(w.dimensions(), (1536, 768));

    let small = DynamicImage::new_rgba8(100, 80);
    assert_eq!(working_image(small, 1536).dimensions(), (100, 80));
}

#[test]
fn input_tensor_is_nchw_unit_range() {
    let working = RgbaImage::from_pixel(8, 4, image::Rgba([255, 0, 51, 255]));
    let t = input_tensor(&working, 6);
    assert_eq!(t.shape(), &[1, 3, 6, 6]);
    assert!((t[[0, 0, 3, 3]] - 1.0).abs() < 1e-6);
    assert!(t[[0, 1, 3, 3]].abs() < 1e-6);
    assert!((t[[0, 2, 3, 3]] - 0.2).abs() < 1e-6);
}

#[test]
fn squash_decision_samples_leading_values() {
    assert!(!needs_squash(&[0.0, 0.5, 1.0, -0.005, 1.005]));
    assert!(needs_squash(&[0.2, 3.0]));
    assert!(needs_squash(&[-0.5]));

    let mut late = vec![0.5; SQUASH_SAMPLE];
    late.push(40.0);
    assert!(!needs_squash(&late));
}

#[test]
fn probabilities_are_stretched_without_squash() {
    let mask = MaskTensor::new(vec![0.0, 0.5, 1.0, 0.25], 2, 2).unwrap();
    let alpha = mask_to_alpha(mask, 2, 2).unwrap();
    assert_eq!(alpha.into_raw(), vec![0, 128, 255, 64]);
}

#[test]
fn logits_are_squashed_then_stretched() {
    let mask = MaskTensor::new(vec![-6.0, 0.0, 6.0, 0.0], 2, 2).unwrap();
    let alpha = mask_to_alpha(mask, 2, 2).unwrap().into_raw();
    assert_eq!(alpha[0], 0);
    assert_eq!(alpha[2], 255);
    assert!((127..=128).contains(&alpha[1]));
}

#[test]
fn flat_mask_is_all_or_nothing() {
    let high = MaskTensor::new(vec![0.9; 4], 2, 2).unwrap();
    assert_eq!(mask_to_alpha(high, 2, 2).unwrap().into_raw(), vec![255; 4]);
    let low = MaskTensor::new(vec![0.1; 4], 2, 2).unwrap();
    assert_eq!(mask_to_alpha(low, 2, 2).unwrap().into_raw(), vec![0; 4]);
}

#[test]
fn mask_is_resampled_to_working_size() {
    let mask = MaskTensor::new(vec![1.0, 0.0, 0.0, 1.0], 2, 2).unwrap();
    let alpha = mask_to_alpha(mask, 20, 10).unwrap();
    assert_eq!(alpha.dimensions(), (20, 10));
    assert!(alpha.get_pixel(1, 1).0[0] > 200);
    assert!(alpha.get_pixel(18, 1).0[0] < 55);
}

#[test]
fn segment_cuts_and_crops_subject() {
    let s = segmenter(Loader::Fixed(block_mask(10, 3, 7, 1.0, 0.0)));
    let result = s.segment(&png(80, 40));
    assert!(result.success, "{:?}", result.message());
    assert!(result.error.is_none());
    let cutout = result.into_result().unwrap();
    // Working image is 40x20; the cut-out is strictly smaller and keeps the photo colors.
    assert!(cutout.width < 40 && cutout.height < 20);
    let center = cutout.pixel(cutout.width / 2, cutout.height / 2);
    assert_eq!(&center[..3], &[30, 60, 90]);
    assert!(center[3] > 200);
}

#[test]
fn empty_mask_returns_uncropped_working_image() {
    let s = segmenter(Loader::Fixed(MaskTensor::new(vec![0.0; 16], 4, 4).unwrap()));
    let cutout = s.segment(&png(40, 20)).into_result().unwrap();
    assert_eq!((cutout.width, cutout.height), (40, 20));
    assert!(cutout.data.chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn failures_are_structured_results() {
    let undecodable = segmenter(Loader::Fixed(block_mask(4, 1, 3, 1.0, 0.0))).segment(b"nope");
    assert!(!undecodable.success);
    assert!(undecodable.cutout.is_none());
    assert!(matches!(undecodable.error, Some(CutframeError::Decode(_))));

    let init = segmenter(Loader::FailingInit).segment(&png(8, 8));
    assert!(matches!(init.error, Some(CutframeError::InferenceInit(_))));
    assert!(init.message().unwrap().starts_with("inference init error:"));

    let run = segmenter(Loader::FailingRun).segment(&png(8, 8));
    assert!(matches!(run.error, Some(CutframeError::InferenceRun(_))));
}
