/// Multi-frame GIF assembly with a single global palette.
pub mod document;
