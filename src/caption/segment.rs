use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::error::{GifTextError, GifTextResult};

/// A run of Unicode "Other Symbol" characters. Adjacent symbols form one glyph.
static GLYPH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{So}+").expect("glyph pattern is valid"));

static TRAILING_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{So}+\s*$").expect("trailing glyph pattern is valid"));

/// One frame's caption: display text plus the status glyph that terminated it.
///
/// `glyph` is empty for a trailing remainder that had no symbol after it. Such a token cannot be
/// rendered; see [`CaptionToken::require_glyph`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CaptionToken {
    pub text: String,
    pub glyph: String,
}

impl CaptionToken {
    pub fn new(text: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            glyph: glyph.into(),
        }
    }

    pub fn require_glyph(&self) -> GifTextResult<&str> {
        if self.glyph.is_empty() {
            return Err(GifTextError::segmentation(format!(
                "caption '{}' has no status glyph",
                self.text
            )));
        }
        Ok(&self.glyph)
    }
}

impl std::fmt::Display for CaptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.glyph.is_empty() {
            write!(f, "{}", self.text)
        } else {
            write!(f, "{} {}", self.text, self.glyph)
        }
    }
}

/// All glyph runs in `caption`, in order of occurrence, repeats included.
pub fn extract_glyphs(caption: &str) -> Vec<String> {
    GLYPH_RUN
        .find_iter(caption)
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Split a raw caption into per-frame tokens.
///
/// The caption is folded over its glyph list: on each glyph every current segment is split on
/// that glyph, pieces are trimmed, empty pieces are dropped, and every piece but the last of a
/// split gets the glyph re-attached. A glyph that occurs more than once is folded once per
/// occurrence; segments it already terminated are split again and come back unchanged.
pub fn segment_caption(caption: &str) -> Vec<CaptionToken> {
    let glyphs = extract_glyphs(caption);
    let segments = fold_segments(vec![caption.trim().to_owned()], &glyphs);
    let tokens: Vec<CaptionToken> = segments.iter().map(|s| split_token(s)).collect();
    tracing::debug!(glyphs = glyphs.len(), tokens = tokens.len(), "segmented caption");
    tokens
}

pub(crate) fn fold_segments(mut segments: Vec<String>, glyphs: &[String]) -> Vec<String> {
    for glyph in glyphs {
        let mut next = Vec::with_capacity(segments.len() + 1);
        for segment in &segments {
            let pieces: Vec<&str> = segment.split(glyph.as_str()).collect();
            let last = pieces.len() - 1;
            for (i, piece) in pieces.into_iter().enumerate() {
                let piece = piece.trim();
                if piece.is_empty() {
                    continue;
                }
                if i < last {
                    next.push(format!("{piece}{glyph}"));
                } else {
                    next.push(piece.to_owned());
                }
            }
        }
        segments = next;
    }
    segments
}

fn split_token(segment: &str) -> CaptionToken {
    match TRAILING_GLYPH.find(segment) {
        Some(m) => CaptionToken {
            text: segment[..m.start()].trim().to_owned(),
            glyph: m.as_str().trim().to_owned(),
        },
        None => CaptionToken {
            text: segment.trim().to_owned(),
            glyph: String::new(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/segment.rs"]
mod tests;
