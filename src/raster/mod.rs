//! Fixed palettes and indexed rasters.

pub mod palette;
pub mod paletted;
