//! Greedy selection of minimal, non-overlapping, decodable frames.

use dotframe_code::{decode_frame, DecodeParams};
use dotframe_core::{DetectedBy, Dot, Frame, Wedge};
use log::{debug, trace};

use crate::assemble::FrameCandidate;
use crate::graph::DotGraph;
use crate::wedges::WedgeNode;

/// Output buffer for one invocation, bounded by the caller's capacity.
#[derive(Clone, Debug)]
pub struct FrameSink {
    frames: Vec<Frame>,
    capacity: usize,
}

impl FrameSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    /// Append `frame`; returns `false` (dropping it) when full.
    pub fn push(&mut self, frame: Frame) -> bool {
        if self.is_full() {
            return false;
        }
        self.frames.push(frame);
        true
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

fn output_wedge(graph: &DotGraph, dots: &[Dot], node: &WedgeNode) -> Wedge {
    Wedge::new(node.dots.map(|i| dots[graph.dots[i].source]))
}

/// Accept candidates smallest-first.
///
/// A candidate is skipped if any of its dots already belongs to an accepted
/// frame, and dropped if it does not decode. Accepting a frame marks its
/// wedges used, watermarks its graph dots with the frame size and clears
/// `valid` on the corresponding input dots. Returns the number accepted.
pub fn select_minimal_frames(
    graph: &mut DotGraph,
    wedges: &mut [WedgeNode],
    candidates: &[FrameCandidate],
    dots: &mut [Dot],
    decode: &DecodeParams,
    sink: &mut FrameSink,
) -> usize {
    let mut accepted = 0;
    let mut undecodable = 0;

    for candidate in candidates {
        if sink.is_full() {
            debug!("frame capacity {} reached", sink.len());
            break;
        }
        let overlaps = candidate.wedges.iter().any(|&w| {
            wedges[w]
                .dots
                .iter()
                .any(|&d| graph.dots[d].is_claimed_within(candidate.frame_size))
        });
        if overlaps {
            continue;
        }

        let mut frame = Frame::new(
            candidate.wedges.map(|w| output_wedge(graph, dots, &wedges[w])),
            DetectedBy::Scratch,
        );
        let Some(decoded) = decode_frame(&frame, decode) else {
            undecodable += 1;
            continue;
        };
        frame.wedges.rotate_left(decoded.rotation);
        frame.code = Some(decoded.code);

        for &w in &candidate.wedges {
            wedges[w].used_by_frame = true;
            for &d in &wedges[w].dots {
                let node = &mut graph.dots[d];
                node.used_at_size = candidate.frame_size;
                dots[node.source].valid = false;
            }
        }
        trace!(
            "accepted frame {} (size {:.1})",
            decoded.code,
            candidate.frame_size
        );
        sink.push(frame);
        accepted += 1;
    }

    debug!(
        "selection: {} of {} candidates accepted, {} undecodable",
        accepted,
        candidates.len(),
        undecodable
    );
    accepted
}

/// Wedges that are unused and touch no claimed dot, detached from any links.
pub fn leftover_wedges(graph: &DotGraph, wedges: &[WedgeNode]) -> Vec<WedgeNode> {
    wedges
        .iter()
        .filter(|w| !w.used_by_frame && w.dots.iter().all(|&d| !graph.dots[d].is_claimed()))
        .map(WedgeNode::detached)
        .collect()
}
