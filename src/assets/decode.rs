use std::sync::Arc;

use image::RgbaImage;

use crate::foundation::error::{GifTextError, GifTextResult};

/// Decode encoded raster bytes (PNG, JPEG, and the other formats `image` is built with) into
/// straight-alpha RGBA8.
pub fn decode_raster(bytes: &[u8]) -> GifTextResult<RgbaImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| GifTextError::decode(format!("unrecognized image format: {e}")))?;
    let dyn_img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| GifTextError::decode(format!("decode {format:?} image: {e}")))?;
    Ok(dyn_img.to_rgba8())
}

/// Cheap sniff for SVG documents, so icon assets can be either raster or vector.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    // The cut may land inside a multibyte character; sniff the valid prefix.
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return false,
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("<svg") {
        return true;
    }
    // Prolog, comments and doctype may push the root element past the head.
    text.starts_with("<?xml") && bytes.windows(4).any(|w| w == b"<svg")
}

/// Parse SVG bytes into a `usvg` tree using the given font database.
pub fn parse_svg(
    bytes: &[u8],
    fontdb: Arc<usvg::fontdb::Database>,
) -> GifTextResult<usvg::Tree> {
    let opts = usvg::Options {
        fontdb,
        font_resolver: crate::render::text::font_resolver(),
        ..Default::default()
    };
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| GifTextError::decode(format!("parse svg tree: {e}")))
}

/// Rasterize `tree` scaled to exactly `width`x`height`, returning straight-alpha RGBA8.
pub fn rasterize_svg(tree: &usvg::Tree, width: u32, height: u32) -> GifTextResult<RgbaImage> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| GifTextError::render("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    pixmap_to_rgba(pixmap)
}

/// Convert a premultiplied `tiny_skia` pixmap into a straight-alpha image.
pub(crate) fn pixmap_to_rgba(pixmap: resvg::tiny_skia::Pixmap) -> GifTextResult<RgbaImage> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut data = pixmap.take();
    unpremultiply_rgba8_in_place(&mut data);
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| GifTextError::render("pixmap buffer size mismatch"))
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
