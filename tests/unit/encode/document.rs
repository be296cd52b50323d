use std::{io::Cursor, path::PathBuf, sync::Arc};

use image::RgbaImage;

use super::*;
use crate::foundation::core::Rgb8;
use crate::foundation::error::ErrorKind;
use crate::raster::palette::Palette;

struct Decoded {
    global_palette: Option<Vec<u8>>,
    frames: Vec<(u16, bool, Vec<u8>)>,
}

fn decode(bytes: &[u8]) -> Decoded {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut dec = opts.read_info(Cursor::new(bytes)).unwrap();
    let global_palette = dec.global_palette().map(|p| p.to_vec());
    let mut frames = Vec::new();
    while let Some(f) = dec.read_next_frame().unwrap() {
        frames.push((f.delay, f.palette.is_some(), f.buffer.to_vec()));
    }
    Decoded {
        global_palette,
        frames,
    }
}

fn solid(palette: &Arc<Palette>, c: [u8; 4]) -> PalettedFrame {
    PalettedFrame::quantize(
        &RgbaImage::from_pixel(6, 4, image::Rgba(c)),
        palette,
        Rgb8::WHITE,
    )
}

#[test]
fn empty_input_is_encode_error() {
    let err = assemble_gif(&[], 50).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encode);
}

#[test]
fn two_frames_share_global_palette_and_delay() {
    let palette = Arc::new(Palette::plan9());
    let frames = vec![
        solid(&palette, [255, 0, 0, 255]),
        solid(&palette, [0, 0, 255, 255]),
    ];
    let bytes = assemble_gif(&frames, 50).unwrap();
    let doc = decode(&bytes);

    assert_eq!(doc.global_palette.as_deref(), Some(palette.to_rgb_bytes().as_slice()));
    assert_eq!(doc.frames.len(), 2);
    for (i, (delay, has_local, pixels)) in doc.frames.iter().enumerate() {
        assert_eq!(*delay, 50);
        assert!(!has_local);
        assert_eq!(pixels, &frames[i].pixels);
    }
}

#[test]
fn round_trip_keeps_frame_count_and_palette_size() {
    let palette = Arc::new(Palette::plan9());
    let frames: Vec<PalettedFrame> = [[0, 0, 0, 255], [255, 255, 255, 255], [0, 255, 0, 255]]
        .into_iter()
        .map(|c| solid(&palette, c))
        .collect();
    let doc = decode(&assemble_gif(&frames, 100).unwrap());
    assert_eq!(doc.frames.len(), 3);
    assert_eq!(doc.global_palette.unwrap().len() / 3, palette.len());
}

#[test]
fn web_safe_round_trip_keeps_table_exactly() {
    let palette = Arc::new(Palette::web_safe());
    let frames = vec![
        solid(&palette, [0, 51, 102, 255]),
        solid(&palette, [255, 255, 255, 255]),
    ];
    let doc = decode(&assemble_gif(&frames, 100).unwrap());
    assert_eq!(doc.frames.len(), 2);
    let table = doc.global_palette.unwrap();
    assert_eq!(table.len() / 3, palette.len());
    assert_eq!(table, palette.to_rgb_bytes());
}

#[test]
fn multi_frame_documents_loop_forever() {
    let palette = Arc::new(Palette::plan9());
    let frames = vec![solid(&palette, [0; 4]), solid(&palette, [0; 4])];
    let bytes = assemble_gif(&frames, 10).unwrap();
    assert!(bytes.windows(11).any(|w| w == b"NETSCAPE2.0"));

    let single = assemble_gif(&frames[..1], 10).unwrap();
    assert!(!single.windows(11).any(|w| w == b"NETSCAPE2.0"));
}

#[test]
fn mismatched_pixel_buffer_is_encode_error() {
    let palette = Arc::new(Palette::plan9());
    let mut f = solid(&palette, [0; 4]);
    f.pixels.pop();
    assert_eq!(assemble_gif(&[f], 10).unwrap_err().kind(), ErrorKind::Encode);
}

#[test]
fn oversized_frame_is_encode_error() {
    let palette = Arc::new(Palette::plan9());
    let f = PalettedFrame {
        width: 70_000,
        height: 1,
        pixels: vec![0; 70_000],
        palette,
    };
    assert_eq!(assemble_gif(&[f], 10).unwrap_err().kind(), ErrorKind::Encode);
}

#[test]
fn write_gif_creates_parent_dirs() {
    let path = PathBuf::from("target")
        .join("unit_write_gif")
        .join("nested")
        .join("out.gif");
    let _ = std::fs::remove_file(&path);
    write_gif(&path, b"GIF89a").unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), b"GIF89a");
}
