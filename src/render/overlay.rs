use std::sync::Arc;

use image::{RgbaImage, imageops};

use crate::assets::icons::IconCache;
use crate::caption::glyphs::GlyphIconMap;
use crate::caption::segment::CaptionToken;
use crate::foundation::core::Rgb8;
use crate::foundation::error::GifTextResult;
use crate::raster::paletted::PalettedFrame;
use crate::render::text::CaptionText;

/// Caption band geometry and colors. Units are output pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Height of the band appended below the source image.
    pub band_height: u32,
    /// Left margin of the caption text.
    pub text_left: f32,
    /// Baseline position below the source image's bottom edge.
    pub baseline_offset: f32,
    /// Icons are scaled to fit this square.
    pub icon_size: u32,
    /// Gap between the end of the text and the icon.
    pub icon_margin: f32,
    /// Gap between the icon's bottom and the canvas bottom.
    pub bottom_inset: u32,
    pub font_size: f32,
    pub font_family: String,
    pub background: Rgb8,
    pub foreground: Rgb8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            band_height: 25,
            text_left: 10.0,
            baseline_offset: 20.0,
            icon_size: 20,
            icon_margin: 5.0,
            bottom_inset: 1,
            font_size: 16.0,
            font_family: "sans-serif".to_owned(),
            background: Rgb8::WHITE,
            foreground: Rgb8::BLACK,
        }
    }
}

/// Resolved positions for one composed frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub text_x: f32,
    pub baseline_y: f32,
    pub icon_x: i64,
    pub icon_y: i64,
}

impl OverlayStyle {
    /// Place text and icon for a `src_w`x`src_h` source, given the measured text width and the
    /// scaled icon height.
    pub fn layout(&self, src_w: u32, src_h: u32, text_width: f32, icon_h: u32) -> OverlayLayout {
        let canvas_height = src_h + self.band_height;
        let icon_x = (self.text_left + text_width + self.icon_margin).floor() as i64;
        let icon_y =
            i64::from(canvas_height) - i64::from(icon_h) - i64::from(self.bottom_inset);
        OverlayLayout {
            canvas_width: src_w,
            canvas_height,
            text_x: self.text_left,
            baseline_y: src_h as f32 + self.baseline_offset,
            icon_x,
            icon_y,
        }
    }
}

/// Composites a caption band with text and a status icon under a paletted frame.
#[derive(Debug)]
pub struct GlyphOverlay {
    style: OverlayStyle,
    glyphs: GlyphIconMap,
    icons: Arc<IconCache>,
    text: CaptionText,
}

impl GlyphOverlay {
    pub fn new(
        style: OverlayStyle,
        glyphs: GlyphIconMap,
        icons: Arc<IconCache>,
        text: CaptionText,
    ) -> Self {
        Self {
            style,
            glyphs,
            icons,
            text,
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Compose `token` under `src` and re-quantize into `src`'s palette.
    ///
    /// Fails with a segmentation error when the token has no glyph, and with a render error when
    /// the glyph is unmapped or its icon cannot be loaded. `src` is never modified.
    pub fn render(
        &self,
        src: &PalettedFrame,
        token: &CaptionToken,
    ) -> GifTextResult<PalettedFrame> {
        let glyph = token.require_glyph()?;
        let icon_id = self.glyphs.icon_for(glyph)?;
        let icon = self.icons.scaled(icon_id, self.style.icon_size)?;

        let provisional = self.style.layout(src.width, src.height, 0.0, icon.height());
        let mut canvas = RgbaImage::from_pixel(
            provisional.canvas_width,
            provisional.canvas_height,
            image::Rgba([
                self.style.background.r,
                self.style.background.g,
                self.style.background.b,
                255,
            ]),
        );
        imageops::replace(&mut canvas, &src.to_rgba(), 0, 0);

        let text_layer = self.text.render(
            &token.text,
            provisional.canvas_width,
            provisional.canvas_height,
            provisional.text_x,
            provisional.baseline_y,
            self.style.foreground,
        )?;
        imageops::overlay(&mut canvas, &text_layer.image, 0, 0);

        let layout = self
            .style
            .layout(src.width, src.height, text_layer.width, icon.height());
        imageops::overlay(&mut canvas, &*icon, layout.icon_x, layout.icon_y);

        Ok(PalettedFrame::quantize(
            &canvas,
            &src.palette,
            self.style.background,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
