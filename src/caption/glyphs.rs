use std::collections::BTreeMap;

use crate::foundation::error::{GifTextError, GifTextResult};

/// Closed mapping from status glyph to icon asset identifier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct GlyphIconMap {
    entries: BTreeMap<String, String>,
}

impl GlyphIconMap {
    pub fn new<I, G, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (G, A)>,
        G: Into<String>,
        A: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(g, a)| (g.into(), a.into()))
                .collect(),
        }
    }

    /// Checkmark and cross icons.
    pub fn builtin() -> Self {
        Self::new([("✅", "verifica.png"), ("❌", "fechar.png")])
    }

    pub fn icon_for(&self, glyph: &str) -> GifTextResult<&str> {
        self.entries
            .get(glyph)
            .map(String::as_str)
            .ok_or_else(|| GifTextError::render(format!("no icon mapped for glyph '{glyph}'")))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(g, a)| (g.as_str(), a.as_str()))
    }
}

impl Default for GlyphIconMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/glyphs.rs"]
mod tests;
