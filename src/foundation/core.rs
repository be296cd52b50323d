use crate::foundation::error::{GifTextError, GifTextResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared euclidean distance in RGB space.
    pub fn dist2(self, other: Self) -> u32 {
        let dr = i32::from(self.r) - i32::from(other.r);
        let dg = i32::from(self.g) - i32::from(other.g);
        let db = i32::from(self.b) - i32::from(other.b);
        (dr * dr + dg * dg + db * db) as u32
    }

    /// `#rrggbb`, as used in SVG paint attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Straight-alpha "over" blend of `src` on top of `self`.
    pub fn blend_over(self, src: Self, alpha: u8) -> Self {
        let a = u16::from(alpha);
        let mix = |dst: u8, src: u8| -> u8 {
            ((u16::from(src) * a + u16::from(dst) * (255 - a) + 127) / 255) as u8
        };
        Self {
            r: mix(self.r, src.r),
            g: mix(self.g, src.g),
            b: mix(self.b, src.b),
        }
    }
}

/// Output frame dimensions in pixels (both > 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> GifTextResult<Self> {
        if width == 0 || height == 0 {
            return Err(GifTextError::config(format!(
                "frame size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
