//! Caption parsing: raw annotated caption string to per-frame `(text, glyph)` tokens.

pub mod glyphs;
pub mod segment;
