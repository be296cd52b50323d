use std::io::Cursor;

use super::*;
use crate::foundation::error::ErrorKind;

fn encode(img: image::RgbImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

#[test]
fn decode_png_and_jpeg() {
    let img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 200, 30]));

    let png = decode_raster(&encode(img.clone(), image::ImageFormat::Png)).unwrap();
    assert_eq!(png.dimensions(), (3, 2));
    assert_eq!(png.get_pixel(0, 0).0, [10, 200, 30, 255]);

    let jpeg = decode_raster(&encode(img, image::ImageFormat::Jpeg)).unwrap();
    assert_eq!(jpeg.dimensions(), (3, 2));
    assert_eq!(jpeg.get_pixel(1, 1).0[3], 255);
}

#[test]
fn garbage_is_decode_error() {
    let err = decode_raster(b"definitely not an image").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);

    let mut truncated = encode(
        image::RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3])),
        image::ImageFormat::Png,
    );
    truncated.truncate(20);
    assert_eq!(decode_raster(&truncated).unwrap_err().kind(), ErrorKind::Decode);
}

#[test]
fn svg_sniffing() {
    assert!(looks_like_svg(br#"<svg xmlns="http://www.w3.org/2000/svg"/>"#));
    assert!(looks_like_svg(
        br#"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg"/>"#
    ));
    assert!(!looks_like_svg(b"\x89PNG\r\n"));
}

#[test]
fn svg_sniffing_survives_multibyte_char_at_cutoff() {
    let mut doc = br#"<?xml version="1.0" encoding="UTF-8"?><!--"#.to_vec();
    doc.resize(511, b' ');
    doc.extend_from_slice("© -->".as_bytes());
    doc.extend_from_slice(br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#);
    assert_eq!(doc[511], 0xc2);
    assert!(looks_like_svg(&doc));
}

#[test]
fn rasterize_svg_scales_to_requested_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="2" height="2">
<rect width="2" height="2" fill="#ff0000"/></svg>"##;
    let fontdb = Arc::new(usvg::fontdb::Database::new());
    let tree = parse_svg(svg, fontdb).unwrap();
    let img = rasterize_svg(&tree, 8, 8).unwrap();
    assert_eq!(img.dimensions(), (8, 8));
    assert_eq!(img.get_pixel(4, 4).0, [255, 0, 0, 255]);
}

#[test]
fn parse_svg_rejects_malformed() {
    let fontdb = Arc::new(usvg::fontdb::Database::new());
    assert_eq!(
        parse_svg(b"<svg", fontdb).unwrap_err().kind(),
        ErrorKind::Decode
    );
}
