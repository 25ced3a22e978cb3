use super::*;

fn with_dot(w: u32, h: u32, x: u32, y: u32, alpha: u8) -> ImageRgba8 {
    let mut img = ImageRgba8::transparent(w, h);
    img.set_pixel(x, y, [9, 9, 9, alpha]);
    img
}

#[test]
fn bounds_are_padded_and_clamped() {
    let img = with_dot(50, 40, 20, 15, 200);
    assert_eq!(
        alpha_bounds(&img, 10, 5),
        Some(CropBox { x: 15, y: 10, width: 11, height: 11 })
    );

    let corner = with_dot(50, 40, 1, 38, 200);
    let b = alpha_bounds(&corner, 10, 10).unwrap();
    assert_eq!((b.x, b.y), (0, 28));
    assert!(b.x + b.width <= 50 && b.y + b.height <= 40);
}

#[test]
fn threshold_is_strict() {
    let img = with_dot(10, 10, 3, 3, 10);
    assert_eq!(alpha_bounds(&img, 10, 0), None);
    assert!(alpha_bounds(&img, 9, 0).is_some());
}

#[test]
fn nothing_above_threshold_returns_image_unchanged() {
    let img = with_dot(12, 8, 3, 3, 4);
    assert_eq!(crop_to_alpha(img.clone(), 10, 10).unwrap(), img);
}

#[test]
fn crop_copies_the_region() {
    let img = with_dot(30, 30, 10, 12, 255);
    let out = crop_to_alpha(img, 10, 2).unwrap();
    assert_eq!((out.width, out.height), (5, 5));
    assert_eq!(out.pixel(2, 2), [9, 9, 9, 255]);
    assert_eq!(out.pixel(0, 0)[3], 0);
}

#[test]
fn crop_never_leaves_image_bounds() {
    for (x, y) in [(0, 0), (29, 0), (0, 19), (29, 19), (14, 9)] {
        let img = with_dot(30, 20, x, y, 255);
        let b = alpha_bounds(&img, 10, 50).unwrap();
        assert_eq!(b, CropBox { x: 0, y: 0, width: 30, height: 20 });
    }
}

#[test]
fn crop_keeps_rows_aligned_at_an_offset() {
    let mut img = ImageRgba8::transparent(16, 12);
    img.set_pixel(5, 4, [1, 2, 3, 255]);
    img.set_pixel(9, 7, [4, 5, 6, 120]);
    let area = CropBox { x: 5, y: 4, width: 5, height: 4 };
    let out = crop(img, area).unwrap();
    assert_eq!((out.width, out.height), (5, 4));
    assert_eq!(out.pixel(0, 0), [1, 2, 3, 255]);
    assert_eq!(out.pixel(4, 3), [4, 5, 6, 120]);
    assert_eq!(out.pixel(2, 1), [0, 0, 0, 0]);
}
