use std::{sync::Arc, time::Duration};

use crate::assets::icons::{IconCache, IconSource};
use crate::caption::glyphs::GlyphIconMap;
use crate::caption::segment::{CaptionToken, segment_caption};
use crate::encode::document::assemble_gif;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{GifTextError, GifTextResult};
use crate::pipeline::aggregate::{AggregatedFrames, Hole, collect_frames};
use crate::pipeline::process::{CancelToken, FrameInput, FrameProcessor, build_thread_pool};
use crate::raster::palette::PaletteKind;
use crate::raster::paletted::PalettedFrame;
use crate::render::overlay::{GlyphOverlay, OverlayStyle};
use crate::render::text::CaptionText;

/// What to do when some frames fail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolePolicy {
    /// Any hole fails the run with the first hole's error.
    #[default]
    Strict,
    /// Encode the surviving frames; fails only if none survive.
    Lenient,
}

#[derive(Clone, Debug)]
pub struct PipelineOpts {
    pub size: FrameSize,
    /// Per-frame delay in hundredths of a second.
    pub delay_cs: u16,
    pub hole_policy: HolePolicy,
    pub palette: PaletteKind,
    /// Worker count; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Longest wait for the next frame to complete before the batch is cancelled.
    pub unit_timeout: Option<Duration>,
    pub style: OverlayStyle,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            size: FrameSize::default(),
            delay_cs: 100,
            hole_policy: HolePolicy::default(),
            palette: PaletteKind::default(),
            threads: None,
            unit_timeout: None,
            style: OverlayStyle::default(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug)]
pub struct GifRun {
    /// The encoded GIF document.
    pub bytes: Vec<u8>,
    pub frame_count: usize,
    /// Frames left out under [`HolePolicy::Lenient`]; always empty under `Strict`.
    pub holes: Vec<Hole>,
}

/// Captioned GIF generation: segment, process frames in parallel, aggregate, assemble.
///
/// Holds no per-run state; one pipeline can serve any number of runs.
#[derive(Debug)]
pub struct GifPipeline {
    opts: PipelineOpts,
    processor: Arc<FrameProcessor>,
}

impl GifPipeline {
    pub fn new(
        opts: PipelineOpts,
        glyphs: GlyphIconMap,
        icons: Arc<dyn IconSource>,
        fontdb: Arc<usvg::fontdb::Database>,
    ) -> GifTextResult<Self> {
        if glyphs.is_empty() {
            return Err(GifTextError::config("glyph icon map is empty"));
        }
        if let Some(t) = opts.unit_timeout
            && t.is_zero()
        {
            return Err(GifTextError::config("unit timeout must be > 0"));
        }

        let icon_cache = Arc::new(IconCache::new(icons, Arc::clone(&fontdb)));
        let text = CaptionText::new(fontdb, opts.style.font_family.clone(), opts.style.font_size);
        let overlay = GlyphOverlay::new(opts.style.clone(), glyphs, icon_cache, text);
        let processor = FrameProcessor::new(opts.size, opts.palette.build(), overlay);

        Ok(Self {
            opts,
            processor: Arc::new(processor),
        })
    }

    pub fn opts(&self) -> &PipelineOpts {
        &self.opts
    }

    /// Segment `caption`, render one frame per image and encode the result.
    #[tracing::instrument(skip_all, fields(images = images.len()))]
    pub fn run(&self, images: Vec<Vec<u8>>, caption: &str) -> GifTextResult<GifRun> {
        let tokens = segment_caption(caption);
        let aggregated = self.process(images, &tokens)?;
        self.finish(aggregated)
    }

    /// Fan out one unit per image and block until every unit has reported or timed out.
    pub fn process(
        &self,
        images: Vec<Vec<u8>>,
        tokens: &[CaptionToken],
    ) -> GifTextResult<AggregatedFrames> {
        if images.is_empty() {
            return Err(GifTextError::encode("no frames to encode"));
        }
        if tokens.len() < images.len() {
            return Err(GifTextError::config(format!(
                "caption has {} tokens for {} images",
                tokens.len(),
                images.len()
            )));
        }
        if tokens.len() > images.len() {
            tracing::info!(
                unused = tokens.len() - images.len(),
                "caption has more tokens than images"
            );
        }

        let inputs: Vec<FrameInput> = images
            .into_iter()
            .zip(tokens.iter().cloned())
            .enumerate()
            .map(|(index, (bytes, caption))| FrameInput::new(index, bytes, caption))
            .collect();
        let expected = inputs.len();

        let pool = build_thread_pool(self.opts.threads)?;
        let cancel = CancelToken::new();
        let rx = self.processor.dispatch(inputs, &pool, &cancel);
        Ok(collect_frames(&rx, expected, self.opts.unit_timeout, &cancel))
    }

    fn finish(&self, aggregated: AggregatedFrames) -> GifTextResult<GifRun> {
        let holes = aggregated.holes.clone();
        if let Some(first) = holes.first() {
            match self.opts.hole_policy {
                HolePolicy::Strict => {
                    tracing::warn!(holes = holes.len(), "rejecting run with failed frames");
                    return Err(first.to_error());
                }
                HolePolicy::Lenient => {
                    tracing::warn!(
                        holes = ?aggregated.hole_indices(),
                        "continuing without failed frames"
                    );
                }
            }
        }

        let frames = aggregated.into_present();
        if frames.is_empty() {
            return Err(GifTextError::encode("every frame failed; nothing to encode"));
        }
        ensure_shared_palette(&frames)?;

        let bytes = assemble_gif(&frames, self.opts.delay_cs)?;
        tracing::info!(frames = frames.len(), bytes = bytes.len(), "gif assembled");
        Ok(GifRun {
            bytes,
            frame_count: frames.len(),
            holes,
        })
    }
}

fn ensure_shared_palette(frames: &[PalettedFrame]) -> GifTextResult<()> {
    let Some(first) = frames.first() else {
        return Ok(());
    };
    for (i, f) in frames.iter().enumerate().skip(1) {
        if !first.shares_palette(f) {
            return Err(GifTextError::encode(format!(
                "frame {i} does not use the document palette"
            )));
        }
    }
    Ok(())
}

/// One-shot run with system fonts.
pub fn generate_gif(
    images: Vec<Vec<u8>>,
    caption: &str,
    opts: PipelineOpts,
    glyphs: GlyphIconMap,
    icons: Arc<dyn IconSource>,
) -> GifTextResult<GifRun> {
    let fontdb = crate::render::text::build_fontdb(&[]);
    GifPipeline::new(opts, glyphs, icons, fontdb)?.run(images, caption)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
