use std::{
    panic::AssertUnwindSafe,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use image::imageops::FilterType;

use crate::assets::decode::decode_raster;
use crate::caption::segment::CaptionToken;
use crate::foundation::core::{FrameSize, Rgb8};
use crate::foundation::error::{ErrorKind, GifTextError, GifTextResult};
use crate::raster::{palette::Palette, paletted::PalettedFrame};
use crate::render::overlay::GlyphOverlay;

/// One source image and its caption, tagged with its position in the input sequence.
#[derive(Clone, Debug)]
pub struct FrameInput {
    pub index: usize,
    pub bytes: Arc<[u8]>,
    pub caption: CaptionToken,
}

impl FrameInput {
    pub fn new(index: usize, bytes: impl Into<Arc<[u8]>>, caption: CaptionToken) -> Self {
        Self {
            index,
            bytes: bytes.into(),
            caption,
        }
    }
}

/// Why a frame produced no raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&GifTextError> for FrameFailure {
    fn from(err: &GifTextError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one processing unit. Exactly one of `raster`/`failure` is set.
#[derive(Clone, Debug)]
pub struct ProcessedFrame {
    pub index: usize,
    pub raster: Option<PalettedFrame>,
    pub failure: Option<FrameFailure>,
}

impl ProcessedFrame {
    pub fn present(index: usize, raster: PalettedFrame) -> Self {
        Self {
            index,
            raster: Some(raster),
            failure: None,
        }
    }

    pub fn absent(index: usize, failure: FrameFailure) -> Self {
        Self {
            index,
            raster: None,
            failure: Some(failure),
        }
    }
}

/// Cooperative cancellation flag shared by a batch of units.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self, index: usize) -> GifTextResult<()> {
        if self.is_cancelled() {
            return Err(GifTextError::cancelled(format!("frame {index} cancelled")));
        }
        Ok(())
    }
}

/// Per-frame decode, resize, quantize and caption overlay.
///
/// Holds only read-only state, so one instance is shared by every worker.
#[derive(Debug)]
pub struct FrameProcessor {
    size: FrameSize,
    palette: Arc<Palette>,
    background: Rgb8,
    overlay: GlyphOverlay,
}

impl FrameProcessor {
    pub fn new(size: FrameSize, palette: Arc<Palette>, overlay: GlyphOverlay) -> Self {
        let background = overlay.style().background;
        Self {
            size,
            palette,
            background,
            overlay,
        }
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Run one unit to completion. Failures (including panics) become an absent frame.
    pub fn process_one(&self, input: &FrameInput, cancel: &CancelToken) -> ProcessedFrame {
        let outcome =
            std::panic::catch_unwind(AssertUnwindSafe(|| self.try_process(input, cancel)))
                .unwrap_or_else(|_| {
                    Err(GifTextError::render(format!(
                        "frame {} worker panicked",
                        input.index
                    )))
                });

        match outcome {
            Ok(raster) => ProcessedFrame::present(input.index, raster),
            Err(err) => {
                tracing::warn!(index = input.index, error = %err, "frame dropped");
                ProcessedFrame::absent(input.index, FrameFailure::from(&err))
            }
        }
    }

    fn try_process(
        &self,
        input: &FrameInput,
        cancel: &CancelToken,
    ) -> GifTextResult<PalettedFrame> {
        cancel.check(input.index)?;
        let decoded = decode_raster(&input.bytes)?;

        cancel.check(input.index)?;
        let resized = image::imageops::resize(
            &decoded,
            self.size.width,
            self.size.height,
            FilterType::Lanczos3,
        );
        let quantized = PalettedFrame::quantize(&resized, &self.palette, self.background);

        cancel.check(input.index)?;
        self.overlay.render(&quantized, &input.caption)
    }

    /// Spawn one unit per input on `pool`. Results arrive on the returned channel in completion
    /// order; the channel disconnects once every unit has reported.
    pub fn dispatch(
        self: &Arc<Self>,
        inputs: Vec<FrameInput>,
        pool: &rayon::ThreadPool,
        cancel: &CancelToken,
    ) -> mpsc::Receiver<ProcessedFrame> {
        let (tx, rx) = mpsc::channel();
        for input in inputs {
            let tx = tx.clone();
            let this = Arc::clone(self);
            let cancel = cancel.clone();
            pool.spawn(move || {
                let out = this.process_one(&input, &cancel);
                // The aggregator may have given up on this batch already.
                let _ = tx.send(out);
            });
        }
        rx
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> GifTextResult<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("giftext-frame-{i}"));
    if let Some(n) = threads {
        if n == 0 {
            return Err(GifTextError::config("threads must be > 0"));
        }
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GifTextError::config(format!("build frame worker pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/process.rs"]
mod tests;
