use std::sync::Arc;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{GifTextError, GifTextResult};

/// Fixed color table shared by every frame of a document.
///
/// Tables are padded to the next power of two (the sizes a GIF color table can hold) by repeating
/// the last color, so the table written to a document is exactly [`Palette::colors`]. Padding
/// entries never win a [`Palette::nearest`] lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb8>,
}

/// Built-in fixed palettes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteKind {
    /// The 256-color Plan 9 color map.
    #[default]
    Plan9,
    /// The 216-color web-safe cube, padded to a 256-entry table.
    WebSafe,
}

impl PaletteKind {
    pub fn build(self) -> Arc<Palette> {
        Arc::new(match self {
            Self::Plan9 => Palette::plan9(),
            Self::WebSafe => Palette::web_safe(),
        })
    }
}

impl Palette {
    pub fn new(mut colors: Vec<Rgb8>) -> GifTextResult<Self> {
        let Some(&last) = colors.last() else {
            return Err(GifTextError::config("palette must hold at least one color"));
        };
        if colors.len() > 256 {
            return Err(GifTextError::config(format!(
                "palette must hold at most 256 colors, got {}",
                colors.len()
            )));
        }
        colors.resize(gif_table_len(colors.len()), last);
        Ok(Self { colors })
    }

    /// Plan 9's 4-bit-per-channel color map: 16 hue/value blocks of 16 entries each,
    /// with the gray ramp folded into the `den == 0` slots.
    pub fn plan9() -> Self {
        let mut colors = [Rgb8::BLACK; 256];
        let mut i = 0usize;
        for r in 0i32..4 {
            for v in 0i32..4 {
                let mut j = v - r;
                for g in 0i32..4 {
                    for b in 0i32..4 {
                        let den = r.max(g).max(b);
                        let slot = i + (j & 0x0f) as usize;
                        colors[slot] = if den == 0 {
                            let c = (0x11 * v) as u8;
                            Rgb8::new(c, c, c)
                        } else {
                            let num = 17 * (4 * den + v);
                            Rgb8::new(
                                (r * num / den) as u8,
                                (g * num / den) as u8,
                                (b * num / den) as u8,
                            )
                        };
                        j += 1;
                    }
                }
                i += 16;
            }
        }
        Self {
            colors: colors.to_vec(),
        }
    }

    /// The 6x6x6 web-safe cube; entries 216..256 repeat white.
    pub fn web_safe() -> Self {
        let mut colors = Vec::with_capacity(256);
        for r in 0u8..6 {
            for g in 0u8..6 {
                for b in 0u8..6 {
                    colors.push(Rgb8::new(0x33 * r, 0x33 * g, 0x33 * b));
                }
            }
        }
        colors.resize(gif_table_len(colors.len()), Rgb8::WHITE);
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    pub fn color(&self, index: u8) -> Rgb8 {
        self.colors
            .get(usize::from(index))
            .copied()
            .unwrap_or(Rgb8::BLACK)
    }

    /// Index of the closest entry; ties go to the lowest index.
    pub fn nearest(&self, c: Rgb8) -> u8 {
        let mut best = 0usize;
        let mut best_d = u32::MAX;
        for (idx, &p) in self.colors.iter().enumerate() {
            let d = c.dist2(p);
            if d < best_d {
                best = idx;
                best_d = d;
                if d == 0 {
                    break;
                }
            }
        }
        best as u8
    }

    /// Flat `r,g,b` triples, the layout GIF color tables use.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.colors.len() * 3);
        for c in &self.colors {
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }
}

/// Smallest GIF color table size holding `n` colors: a power of two in `2..=256`.
fn gif_table_len(n: usize) -> usize {
    n.next_power_of_two().clamp(2, 256)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/palette.rs"]
mod tests;
