use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn flatten_puts_transparent_pixels_on_background() {
    let rgb = flatten_rgb(&frame(2, 1, [0, 0, 0, 0]), [255, 255, 255, 255]);
    assert_eq!(rgb, vec![255; 6]);
}

#[test]
fn flatten_keeps_opaque_pixels() {
    let rgb = flatten_rgb(&frame(1, 1, [10, 20, 30, 255]), [255, 255, 255, 255]);
    assert_eq!(rgb, vec![10, 20, 30]);
}

#[test]
fn flatten_blends_half_transparent_black_over_white() {
    let rgb = flatten_rgb(&frame(1, 1, [0, 0, 0, 128]), [255, 255, 255, 255]);
    for c in rgb {
        assert!((126..=128).contains(&c), "c={c}");
    }
}

#[test]
fn jpeg_roundtrip_keeps_dimensions() {
    let enc = encode_jpeg(&frame(8, 6, [200, 100, 50, 255]), 92, [255; 4]).unwrap();
    assert_eq!((enc.width, enc.height, enc.format), (8, 6, OutputFormat::Jpeg));
    let decoded = image::load_from_memory(&enc.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (8, 6));
    let px = decoded.to_rgb8().get_pixel(3, 3).0;
    assert!(px[0].abs_diff(200) <= 4 && px[1].abs_diff(100) <= 4 && px[2].abs_diff(50) <= 4);
}

#[test]
fn jpeg_rejects_bad_quality_and_mismatched_buffers() {
    assert!(matches!(
        encode_jpeg(&frame(2, 2, [0; 4]), 0, [255; 4]),
        Err(CutframeError::Encode(_))
    ));
    let mut bad = frame(2, 2, [0; 4]);
    bad.data.pop();
    assert!(matches!(encode_jpeg(&bad, 90, [255; 4]), Err(CutframeError::Encode(_))));
}

#[test]
fn png_keeps_alpha() {
    let enc = encode_png(&frame(3, 3, [64, 0, 0, 128])).unwrap();
    assert_eq!(enc.format.extension(), "png");
    let decoded = image::load_from_memory(&enc.bytes).unwrap().to_rgba8();
    let px = decoded.get_pixel(1, 1).0;
    assert_eq!(px[3], 128);
    assert!(px[0].abs_diff(127) <= 1);
}

#[test]
fn png_image_is_lossless() {
    let img = ImageRgba8::from_raw(2, 1, vec![1, 2, 3, 4, 250, 251, 252, 253]).unwrap();
    let enc = encode_png_image(&img).unwrap();
    let decoded = image::load_from_memory(&enc.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.into_raw(), img.data);
}
