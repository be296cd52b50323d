use std::{
    collections::BTreeSet,
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::Duration,
};

use crate::foundation::error::{ErrorKind, GifTextError};
use crate::pipeline::process::{CancelToken, FrameFailure, ProcessedFrame};
use crate::raster::paletted::PalettedFrame;

/// A position in the ordered result with no raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hole {
    pub index: usize,
    pub failure: FrameFailure,
}

impl Hole {
    /// Error of the hole's original kind, naming the frame.
    pub fn to_error(&self) -> GifTextError {
        GifTextError::of_kind(
            self.failure.kind,
            format!("frame {}: {}", self.index, self.failure.message),
        )
    }
}

/// Processing results restored to input order.
#[derive(Clone, Debug)]
pub struct AggregatedFrames {
    /// One slot per input; `None` where the frame failed.
    pub frames: Vec<Option<PalettedFrame>>,
    /// Failed positions, ascending by index.
    pub holes: Vec<Hole>,
}

impl AggregatedFrames {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    pub fn hole_indices(&self) -> BTreeSet<usize> {
        self.holes.iter().map(|h| h.index).collect()
    }

    /// Present frames in input order, holes skipped.
    pub fn into_present(self) -> Vec<PalettedFrame> {
        self.frames.into_iter().flatten().collect()
    }
}

/// Block until `expected` results have arrived and place each at its carried index.
///
/// With `unit_timeout`, waiting longer than that for the next completion cancels the batch and
/// turns every index still outstanding into a hole. Results with an out-of-range or repeated
/// index are ignored.
pub fn collect_frames(
    rx: &Receiver<ProcessedFrame>,
    expected: usize,
    unit_timeout: Option<Duration>,
    cancel: &CancelToken,
) -> AggregatedFrames {
    let mut frames: Vec<Option<PalettedFrame>> = vec![None; expected];
    let mut failures: Vec<Option<FrameFailure>> = vec![None; expected];
    let mut reported = vec![false; expected];
    let mut received = 0usize;
    let mut missing_reason = "worker exited without reporting";

    while received < expected {
        let next = match unit_timeout {
            Some(timeout) => rx.recv_timeout(timeout),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let item = match next {
            Ok(item) => item,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    received,
                    expected,
                    "no frame completed within unit timeout; cancelling batch"
                );
                cancel.cancel();
                missing_reason = "no result within unit timeout";
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let Some(seen) = reported.get_mut(item.index) else {
            tracing::warn!(index = item.index, expected, "ignoring out-of-range frame result");
            continue;
        };
        if *seen {
            tracing::warn!(index = item.index, "ignoring repeated frame result");
            continue;
        }
        *seen = true;
        received += 1;

        match item.raster {
            Some(raster) => frames[item.index] = Some(raster),
            None => {
                failures[item.index] = Some(item.failure.unwrap_or_else(|| FrameFailure {
                    kind: ErrorKind::Other,
                    message: "frame produced no raster".to_owned(),
                }))
            }
        }
    }

    let mut holes = Vec::new();
    for (index, failure) in failures.into_iter().enumerate() {
        if let Some(failure) = failure {
            holes.push(Hole { index, failure });
        } else if !reported[index] {
            holes.push(Hole {
                index,
                failure: FrameFailure {
                    kind: ErrorKind::Cancelled,
                    message: missing_reason.to_owned(),
                },
            });
        }
    }

    tracing::debug!(
        expected,
        present = expected - holes.len(),
        holes = holes.len(),
        "aggregated frames"
    );
    AggregatedFrames { frames, holes }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/aggregate.rs"]
mod tests;
