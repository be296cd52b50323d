use std::{borrow::Cow, path::Path};

use crate::foundation::error::{GifTextError, GifTextResult};
use crate::raster::paletted::PalettedFrame;

/// Encode `frames` as one animated GIF with a single global color table.
///
/// Every frame is written at the origin with `delay_cs` hundredths of a second and no local
/// palette. The table comes from the first frame; callers must ensure all frames index into the
/// same palette. Multi-frame documents loop forever.
pub fn assemble_gif(frames: &[PalettedFrame], delay_cs: u16) -> GifTextResult<Vec<u8>> {
    let Some(first) = frames.first() else {
        return Err(GifTextError::encode("no frames to encode"));
    };

    let width = frames.iter().map(|f| f.width).max().unwrap_or(first.width);
    let height = frames.iter().map(|f| f.height).max().unwrap_or(first.height);
    let screen_w = to_u16("width", width)?;
    let screen_h = to_u16("height", height)?;

    let mut buf = Vec::new();
    let mut enc = gif::Encoder::new(&mut buf, screen_w, screen_h, &first.palette.to_rgb_bytes())
        .map_err(|e| GifTextError::encode(format!("write gif header: {e}")))?;
    if frames.len() > 1 {
        enc.set_repeat(gif::Repeat::Infinite)
            .map_err(|e| GifTextError::encode(format!("write loop extension: {e}")))?;
    }

    for (i, f) in frames.iter().enumerate() {
        if f.pixels.len() != f.width as usize * f.height as usize {
            return Err(GifTextError::encode(format!(
                "frame {i} has {} pixels for {}x{}",
                f.pixels.len(),
                f.width,
                f.height
            )));
        }
        let frame = gif::Frame {
            width: to_u16("width", f.width)?,
            height: to_u16("height", f.height)?,
            delay: delay_cs,
            buffer: Cow::Borrowed(f.pixels.as_slice()),
            ..gif::Frame::default()
        };
        enc.write_frame(&frame)
            .map_err(|e| GifTextError::encode(format!("write frame {i}: {e}")))?;
    }

    enc.into_inner()
        .map_err(|e| GifTextError::encode(format!("finish gif: {e}")))?;

    tracing::debug!(frames = frames.len(), bytes = buf.len(), delay_cs, "assembled gif");
    Ok(buf)
}

fn to_u16(what: &str, v: u32) -> GifTextResult<u16> {
    u16::try_from(v)
        .map_err(|_| GifTextError::encode(format!("frame {what} {v} exceeds gif limit 65535")))
}

/// Write an encoded document to `path`, creating parent directories as needed.
pub fn write_gif(path: &Path, bytes: &[u8]) -> GifTextResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            GifTextError::io(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    std::fs::write(path, bytes)
        .map_err(|e| GifTextError::io(format!("write gif '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/document.rs"]
mod tests;
