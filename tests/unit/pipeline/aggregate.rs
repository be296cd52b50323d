use std::{sync::Arc, sync::mpsc, thread, time::Duration};

use image::RgbaImage;

use super::*;
use crate::foundation::core::Rgb8;
use crate::raster::palette::Palette;

// Width encodes the index so ordering is observable.
fn marked(index: usize, palette: &Arc<Palette>) -> ProcessedFrame {
    let img = RgbaImage::new(index as u32 + 1, 1);
    ProcessedFrame::present(index, PalettedFrame::quantize(&img, palette, Rgb8::WHITE))
}

fn failed(index: usize, kind: ErrorKind) -> ProcessedFrame {
    ProcessedFrame::absent(
        index,
        FrameFailure {
            kind,
            message: format!("frame {index} broke"),
        },
    )
}

#[test]
fn restores_order_from_shuffled_completions() {
    let palette = Arc::new(Palette::plan9());
    let (tx, rx) = mpsc::channel();

    let delays_ms = [60u64, 0, 30, 10];
    let mut handles = Vec::new();
    for (index, delay) in delays_ms.into_iter().enumerate() {
        let tx = tx.clone();
        let palette = Arc::clone(&palette);
        handles.push(thread::spawn(move || {
            thread::sleep(Duration::from_millis(delay));
            tx.send(marked(index, &palette)).unwrap();
        }));
    }
    drop(tx);

    let out = collect_frames(&rx, 4, None, &CancelToken::new());
    for h in handles {
        h.join().unwrap();
    }

    assert!(out.holes.is_empty());
    assert_eq!(out.present_count(), 4);
    let widths: Vec<u32> = out.into_present().iter().map(|f| f.width).collect();
    assert_eq!(widths, vec![1, 2, 3, 4]);
}

#[test]
fn failed_units_become_holes_in_place() {
    let palette = Arc::new(Palette::plan9());
    let (tx, rx) = mpsc::channel();
    tx.send(marked(2, &palette)).unwrap();
    tx.send(failed(1, ErrorKind::Decode)).unwrap();
    tx.send(marked(0, &palette)).unwrap();
    drop(tx);

    let out = collect_frames(&rx, 3, None, &CancelToken::new());
    assert_eq!(out.len(), 3);
    assert!(out.frames[1].is_none());
    assert_eq!(out.hole_indices().into_iter().collect::<Vec<_>>(), vec![1]);
    assert_eq!(out.holes[0].failure.kind, ErrorKind::Decode);

    let err = out.holes[0].to_error();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("frame 1:"));

    let widths: Vec<u32> = out.into_present().iter().map(|f| f.width).collect();
    assert_eq!(widths, vec![1, 3]);
}

#[test]
fn timeout_cancels_and_reports_missing_indices() {
    let palette = Arc::new(Palette::plan9());
    let (tx, rx) = mpsc::channel();
    tx.send(marked(0, &palette)).unwrap();
    tx.send(marked(2, &palette)).unwrap();

    let cancel = CancelToken::new();
    let out = collect_frames(&rx, 3, Some(Duration::from_millis(50)), &cancel);
    drop(tx);

    assert!(cancel.is_cancelled());
    assert_eq!(out.present_count(), 2);
    assert_eq!(out.holes.len(), 1);
    assert_eq!(out.holes[0].index, 1);
    assert_eq!(out.holes[0].failure.kind, ErrorKind::Cancelled);
}

#[test]
fn disconnect_reports_missing_without_cancelling() {
    let palette = Arc::new(Palette::plan9());
    let (tx, rx) = mpsc::channel();
    tx.send(marked(1, &palette)).unwrap();
    drop(tx);

    let cancel = CancelToken::new();
    let out = collect_frames(&rx, 2, None, &cancel);
    assert!(!cancel.is_cancelled());
    assert_eq!(out.hole_indices().into_iter().collect::<Vec<_>>(), vec![0]);
    assert!(out.holes[0].failure.message.contains("without reporting"));
}

#[test]
fn ignores_out_of_range_and_repeated_results() {
    let palette = Arc::new(Palette::plan9());
    let (tx, rx) = mpsc::channel();
    tx.send(marked(7, &palette)).unwrap();
    tx.send(marked(0, &palette)).unwrap();
    tx.send(failed(0, ErrorKind::Render)).unwrap();
    tx.send(marked(1, &palette)).unwrap();
    drop(tx);

    let out = collect_frames(&rx, 2, None, &CancelToken::new());
    assert!(out.holes.is_empty());
    assert_eq!(out.present_count(), 2);
}

#[test]
fn zero_expected_returns_immediately() {
    let (_tx, rx) = mpsc::channel::<ProcessedFrame>();
    let out = collect_frames(&rx, 0, None, &CancelToken::new());
    assert!(out.is_empty());
    assert!(out.holes.is_empty());
}
