//! Frame reconstruction and tracking for colored-dot fiducials.
//!
//! One call to [`DotFrameDetector::update`] per video frame:
//! - frames from the previous call are carried over, first in place
//!   (stationary), then through a sampled rigid motion (moving),
//! - the remaining dots are linked into a neighbor graph, wedges are found at
//!   right-angle corners and chained into closed 4-cycles,
//! - cycles are accepted smallest-first when they decode and do not overlap
//!   an accepted frame, with a second wide-range pass over leftover wedges,
//! - every output frame gets a physical size estimate.
//!
//! Color decoding lives in `dotframe-code`; shared types in `dotframe-core`.

mod assemble;
mod detector;
mod error;
mod graph;
mod io;
mod params;
mod select;
mod sizing;
mod track;
mod wedges;

pub mod synthetic;

pub use assemble::{assemble_candidates, FrameCandidate};
pub use detector::{DotFrameDetector, DotFrameSession};
pub use error::{DotFrameError, DotFrameIoError};
pub use graph::{DotGraph, GraphDot, NeighborPair};
pub use io::{load_dots, load_frames, DetectedByCounts, DotFrameConfig, DotFrameReport};
pub use params::{
    AssemblyParams, DetectorParams, GraphParams, SizingParams, TrackerParams, WedgeParams,
};
pub use select::{leftover_wedges, select_minimal_frames, FrameSink};
pub use sizing::{estimate_frame_size, size_frame};
pub use track::{track_frames, track_moving, track_stationary, DotIndex, TrackOutcome};
pub use wedges::{build_wedges, WedgeNode};

pub use dotframe_code::DecodeParams;
