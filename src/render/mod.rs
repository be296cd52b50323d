//! Caption band composition.

/// Text, icon and band compositing onto a paletted frame.
pub mod overlay;
/// Caption text shaping and rasterization.
pub mod text;
