use dotframe_core::{Dot, Frame};
use log::debug;
use rand::Rng;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::assemble::assemble_candidates;
use crate::graph::DotGraph;
use crate::params::DetectorParams;
use crate::select::{leftover_wedges, select_minimal_frames, FrameSink};
use crate::sizing::size_frame;
use crate::track::track_frames;
use crate::wedges::{build_wedges, WedgeNode};
use crate::DotFrameError;

struct StageTimer {
    enabled: bool,
    last: Instant,
}

impl StageTimer {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            last: Instant::now(),
        }
    }

    fn tick(&mut self, stage: &str) {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        debug!(
            "stage {stage}: {:.3} ms",
            (now - self.last).as_secs_f64() * 1e3
        );
        self.last = now;
    }
}

/// Per-frame fiducial detector: tracks previous frames, then reconstructs
/// new ones from the remaining dots.
#[derive(Clone, Debug)]
pub struct DotFrameDetector {
    params: DetectorParams,
}

impl DotFrameDetector {
    pub fn new(params: DetectorParams) -> Result<Self, DotFrameError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Process one video frame.
    ///
    /// `prev` are the frames returned by the previous call. Dots claimed by a
    /// returned frame have `valid` cleared; at most `capacity` frames are
    /// returned. Tracked frames come first, then new ones in order of
    /// increasing size.
    pub fn update(&self, dots: &mut [Dot], prev: &[Frame], capacity: usize) -> Vec<Frame> {
        let mut rng = self.params.tracker.rng();
        self.update_with_rng(dots, prev, capacity, &mut rng)
    }

    /// [`update`](Self::update) with a caller-provided random source for the
    /// moving-frame tracker.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(dots = dots.len(), prev = prev.len()))
    )]
    pub fn update_with_rng<R: Rng + ?Sized>(
        &self,
        dots: &mut [Dot],
        prev: &[Frame],
        capacity: usize,
        rng: &mut R,
    ) -> Vec<Frame> {
        let mut timer = StageTimer::new(self.params.debug_timings);
        let mut sink = FrameSink::new(capacity);

        if !self.params.disable_tracking && !prev.is_empty() {
            track_frames(prev, dots, &self.params.tracker, rng, &mut sink);
            timer.tick("track");
        }

        let mut graph = DotGraph::new(dots, &self.params.graph);
        timer.tick("graph");
        let mut wedges = build_wedges(&graph, &self.params.wedge);
        timer.tick("wedges");

        let range = self.params.assembly.first_pass_range;
        self.reconstruct(&mut graph, &mut wedges, range, dots, &mut sink);
        timer.tick("first pass");

        let mut leftovers = leftover_wedges(&graph, &wedges);
        if !leftovers.is_empty() && !sink.is_full() {
            let range = self.params.assembly.second_pass_range;
            self.reconstruct(&mut graph, &mut leftovers, range, dots, &mut sink);
            timer.tick("second pass");
        }

        let mut frames = sink.into_frames();
        for frame in &mut frames {
            size_frame(frame, &self.params.sizing);
        }
        timer.tick("sizing");

        debug!(
            "update: {} dots, {} previous frames, {} frames out",
            dots.len(),
            prev.len(),
            frames.len()
        );
        frames
    }

    /// Reconstruct frames from scratch without touching the caller's dots.
    pub fn detect(&self, dots: &[Dot], capacity: usize) -> Vec<Frame> {
        let mut dots = dots.to_vec();
        self.update(&mut dots, &[], capacity)
    }

    fn reconstruct(
        &self,
        graph: &mut DotGraph,
        wedges: &mut [WedgeNode],
        range: f64,
        dots: &mut [Dot],
        sink: &mut FrameSink,
    ) -> usize {
        let candidates = assemble_candidates(graph, wedges, &self.params.assembly, range);
        select_minimal_frames(
            graph,
            wedges,
            &candidates,
            dots,
            &self.params.decode,
            sink,
        )
    }
}

/// Detector plus the frames of the last processed video frame.
#[derive(Clone, Debug)]
pub struct DotFrameSession {
    detector: DotFrameDetector,
    frames: Vec<Frame>,
    capacity: usize,
}

impl DotFrameSession {
    pub fn new(detector: DotFrameDetector, capacity: usize) -> Self {
        Self {
            detector,
            frames: Vec::new(),
            capacity,
        }
    }

    /// Run one update against the previous result and keep the new one.
    pub fn process(&mut self, dots: &mut [Dot]) -> &[Frame] {
        self.frames = self.detector.update(dots, &self.frames, self.capacity);
        &self.frames
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn detector(&self) -> &DotFrameDetector {
        &self.detector
    }

    /// Forget tracked frames; the next call reconstructs from scratch.
    pub fn reset(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{apply_motion, frame_dots, SyntheticFrame};
    use dotframe_core::{DetectedBy, Homography};
    use nalgebra::{Point2, Vector2};

    fn seeded_detector() -> DotFrameDetector {
        let mut params = DetectorParams::default();
        params.tracker.seed = Some(3);
        DotFrameDetector::new(params).expect("valid params")
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut params = DetectorParams::default();
        params.tracker.nudge = 2.0;
        assert!(DotFrameDetector::new(params).is_err());
    }

    #[test]
    fn detects_marker_from_scratch() {
        let detector = seeded_detector();
        let mut dots = frame_dots(42, &SyntheticFrame::default()).expect("dots");
        let frames = detector.update(&mut dots, &[], 8);

        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.code, Some(42));
        assert_eq!(frame.detected_by, DetectedBy::Scratch);
        assert!((frame.width - 5.25).abs() < 1e-3);
        assert!(dots.iter().all(|d| !d.valid));
    }

    #[test]
    fn empty_input_gives_no_frames() {
        let detector = seeded_detector();
        assert!(detector.update(&mut [], &[], 8).is_empty());
    }

    #[test]
    fn zero_capacity_gives_no_frames() {
        let detector = seeded_detector();
        let mut dots = frame_dots(42, &SyntheticFrame::default()).expect("dots");
        assert!(detector.update(&mut dots, &[], 0).is_empty());
        assert!(dots.iter().all(|d| d.valid));
    }

    #[test]
    fn session_follows_marker_through_motion() {
        let layout = SyntheticFrame::default();
        let mut session = DotFrameSession::new(seeded_detector(), 4);

        let mut dots = frame_dots(42, &layout).expect("dots");
        assert_eq!(session.process(&mut dots)[0].detected_by, DetectedBy::Scratch);

        let mut dots = frame_dots(42, &layout).expect("dots");
        let frames = session.process(&mut dots);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].detected_by, DetectedBy::Stationary);

        let mut dots = frame_dots(42, &layout).expect("dots");
        apply_motion(&mut dots, &Homography::translation(Vector2::new(5.0, -2.0)));
        let frames = session.process(&mut dots);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].detected_by, DetectedBy::Moving);
        assert_eq!(frames[0].code, Some(42));
        assert!((frames[0].corners()[0] - Point2::new(105.0, 98.0)).norm() < 0.5);

        let frames = session.process(&mut []);
        assert!(frames.is_empty());
    }

    #[test]
    fn undecoded_previous_frame_is_rebuilt_not_carried() {
        let detector = seeded_detector();
        let layout = SyntheticFrame::default();
        let mut dots = frame_dots(42, &layout).expect("dots");
        let mut prev = detector.update(&mut dots, &[], 4);
        prev[0].code = None;

        let mut dots = frame_dots(42, &layout).expect("dots");
        let frames = detector.update(&mut dots, &prev, 4);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].code, Some(42));
        assert_eq!(frames[0].detected_by, DetectedBy::Scratch);
        assert!(frames.iter().all(|f| f.has_code()));
    }

    #[test]
    fn disabled_tracking_rebuilds_from_scratch() {
        let mut params = DetectorParams::default();
        params.disable_tracking = true;
        let detector = DotFrameDetector::new(params).expect("valid params");
        let layout = SyntheticFrame::default();

        let mut dots = frame_dots(42, &layout).expect("dots");
        let first = detector.update(&mut dots, &[], 4);
        let mut dots = frame_dots(42, &layout).expect("dots");
        let second = detector.update(&mut dots, &first, 4);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].detected_by, DetectedBy::Scratch);
    }
}
