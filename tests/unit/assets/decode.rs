use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_and_premul() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not a png").is_err());
}

#[test]
fn fully_transparent_pixels_zero_color() {
    let mut px = vec![255u8, 255, 255, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn ensure_drawable_checks_side_limit_and_length() {
    assert!(ensure_drawable(&PreparedImage::from_premul(2, 1, vec![0; 8])).is_ok());
    let wide = MAX_IMAGE_SIDE + 1;
    assert!(ensure_drawable(&PreparedImage::from_premul(wide, 1, vec![0; wide as usize * 4])).is_err());
    assert!(ensure_drawable(&PreparedImage::from_premul(0, 1, Vec::new())).is_err());
    assert!(ensure_drawable(&PreparedImage::from_premul(2, 2, vec![0; 8])).is_err());
}
