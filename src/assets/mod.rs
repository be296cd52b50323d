//! Raster/SVG decoding and icon asset lookup.

pub mod decode;
pub mod icons;
