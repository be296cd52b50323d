//! giftext turns still images plus one annotated caption into a captioned animated GIF.
//!
//! # Pipeline overview
//!
//! 1. **Segment**: the caption string is split into one `(text, glyph)` token per frame
//!    ([`segment_caption`]).
//! 2. **Process**: every image is decoded, resized, quantized into one shared palette and given a
//!    caption band with its text and status icon. Frames run concurrently on a bounded worker
//!    pool; a failing frame becomes a hole instead of failing its siblings.
//! 3. **Aggregate**: results are restored to input order and holes are reported
//!    ([`collect_frames`]).
//! 4. **Assemble**: the ordered frames are encoded into one GIF with a single global color table
//!    ([`assemble_gif`]).
//!
//! [`GifPipeline`] drives all four steps and applies a [`HolePolicy`] to failed frames.
#![forbid(unsafe_code)]

pub mod assets;
pub mod caption;
pub mod config;
pub mod encode;
pub mod foundation;
pub mod pipeline;
pub mod raster;
pub mod render;

pub use assets::decode::decode_raster;
pub use assets::icons::{DirIconSource, IconCache, IconSource, MemoryIconSource};
pub use caption::glyphs::GlyphIconMap;
pub use caption::segment::{CaptionToken, extract_glyphs, segment_caption};
pub use config::JobConfig;
pub use encode::document::{assemble_gif, write_gif};
pub use foundation::core::{FrameSize, Rgb8};
pub use foundation::error::{ErrorKind, GifTextError, GifTextResult};
pub use pipeline::aggregate::{AggregatedFrames, Hole, collect_frames};
pub use pipeline::process::{
    CancelToken, FrameFailure, FrameInput, FrameProcessor, ProcessedFrame,
};
pub use pipeline::run::{GifPipeline, GifRun, HolePolicy, PipelineOpts, generate_gif};
pub use raster::palette::{Palette, PaletteKind};
pub use raster::paletted::PalettedFrame;
pub use render::overlay::{GlyphOverlay, OverlayLayout, OverlayStyle};
pub use render::text::{CaptionText, TextLayer, build_fontdb};
