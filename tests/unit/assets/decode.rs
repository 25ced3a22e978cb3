use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_keep_straight_alpha() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8, 1, 2, 3, 255];
    let img = image::RgbaImage::from_raw(2, 1, src_rgba.clone()).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.width, 2);
    assert_eq!(decoded.height, 1);
    assert_eq!(decoded.data, src_rgba);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CutframeError::Decode(_)));
}
