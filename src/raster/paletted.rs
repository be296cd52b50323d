use std::sync::Arc;

use image::RgbaImage;

use crate::foundation::core::Rgb8;
use crate::raster::palette::Palette;

/// An indexed raster. Every pixel is an index into `palette`.
#[derive(Clone, Debug)]
pub struct PalettedFrame {
    pub width: u32,
    pub height: u32,
    /// One palette index per pixel, row-major.
    pub pixels: Vec<u8>,
    pub palette: Arc<Palette>,
}

impl PalettedFrame {
    /// Map an RGBA raster onto `palette`, flattening alpha over `background` first.
    pub fn quantize(src: &RgbaImage, palette: &Arc<Palette>, background: Rgb8) -> Self {
        let (width, height) = src.dimensions();
        let pixels = src
            .pixels()
            .map(|px| {
                let [r, g, b, a] = px.0;
                let c = if a == 255 {
                    Rgb8::new(r, g, b)
                } else {
                    background.blend_over(Rgb8::new(r, g, b), a)
                };
                palette.nearest(c)
            })
            .collect();

        Self {
            width,
            height,
            pixels,
            palette: Arc::clone(palette),
        }
    }

    /// Expand back to opaque RGBA through the palette.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for (dst, &idx) in out.pixels_mut().zip(self.pixels.iter()) {
            let c = self.palette.color(idx);
            dst.0 = [c.r, c.g, c.b, 255];
        }
        out
    }

    pub fn index_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Same palette instance, or an identical palette definition.
    pub fn shares_palette(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.palette, &other.palette) || *self.palette == *other.palette
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/paletted.rs"]
mod tests;
