//! Carrying frames over from the previous invocation.
//!
//! Two passes run before any reconstruction:
//!
//! - **Stationary**: every previous dot looks for a valid dot within a small
//!   radius. Enough hits and the frame survives in place.
//! - **Moving**: for frames that did not survive, a rigid motion is
//!   hypothesised from two previous dots and two nearby candidate dots, the
//!   whole frame is transformed, and the hypothesis with the lowest matching
//!   cost wins (randomized, bounded number of trials).
//!
//! Both passes clear `valid` on the dots they claim so later stages and
//! later frames cannot reuse them.

use dotframe_core::{
    lerp, rigid_motion_from_pairs, DetectedBy, Dot, Frame, Homography, DOTS_PER_FRAME,
};
use kiddo::{KdTree, SquaredEuclidean};
use log::{debug, trace};
use nalgebra::Point2;
use rand::Rng;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::params::TrackerParams;
use crate::select::FrameSink;

/// KD-tree over all input dot positions; validity is checked at query time.
pub struct DotIndex {
    tree: KdTree<f32, 2>,
}

impl DotIndex {
    pub fn new(dots: &[Dot]) -> Self {
        let coords: Vec<[f32; 2]> = dots.iter().map(|d| [d.position.x, d.position.y]).collect();
        let tree: KdTree<f32, 2> = (&coords).into();
        Self { tree }
    }

    /// Nearest valid dot within `radius` of `p`.
    pub fn nearest_valid(&self, dots: &[Dot], p: Point2<f32>, radius: f32) -> Option<usize> {
        self.tree
            .within::<SquaredEuclidean>(&[p.x, p.y], radius * radius)
            .into_iter()
            .map(|nn| nn.item as usize)
            .find(|&i| dots[i].valid)
    }

    /// Up to `limit` valid dots within `radius` of `p`, nearest first.
    pub fn valid_within(
        &self,
        dots: &[Dot],
        p: Point2<f32>,
        radius: f32,
        limit: usize,
    ) -> Vec<usize> {
        self.tree
            .within::<SquaredEuclidean>(&[p.x, p.y], radius * radius)
            .into_iter()
            .map(|nn| nn.item as usize)
            .filter(|&i| dots[i].valid)
            .take(limit)
            .collect()
    }
}

/// Counts from one tracking run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackOutcome {
    pub stationary: usize,
    pub moving: usize,
    pub dropped: usize,
}

/// Snap each dot of `prev` onto a valid dot within the stationary radius.
///
/// Matches are claimed as they are made and released again if the frame
/// ends up with too few of them.
pub fn track_stationary(
    prev: &Frame,
    dots: &mut [Dot],
    index: &DotIndex,
    params: &TrackerParams,
) -> Option<Frame> {
    let mut frame = *prev;
    let mut matched = Vec::with_capacity(DOTS_PER_FRAME);
    for k in 0..DOTS_PER_FRAME {
        let p = prev.dot(k).position;
        if let Some(i) = index.nearest_valid(dots, p, params.stationary_radius) {
            frame.dot_mut(k).position = dots[i].position;
            dots[i].valid = false;
            matched.push(i);
        }
    }

    if matched.len() >= params.min_stationary_matches {
        frame.detected_by = DetectedBy::Stationary;
        Some(frame)
    } else {
        for i in matched {
            dots[i].valid = true;
        }
        None
    }
}

struct MotionFit {
    frame: Frame,
    matched: Vec<usize>,
    cost: f32,
}

fn evaluate_motion(
    prev: &Frame,
    dots: &[Dot],
    index: &DotIndex,
    motion: &Homography,
    params: &TrackerParams,
) -> MotionFit {
    let radius = params.moving_search_radius;
    let miss_cost = 2.0 * radius * radius;
    let mut frame = *prev;
    let mut matched = Vec::with_capacity(DOTS_PER_FRAME);
    let mut cost = 0.0;

    for k in 0..DOTS_PER_FRAME {
        let estimate = motion.apply(prev.dot(k).position);
        match index.nearest_valid(dots, estimate, radius) {
            Some(i) => {
                cost += dots[i].dist_sq(estimate);
                frame.dot_mut(k).position = lerp(estimate, dots[i].position, params.nudge);
                matched.push(i);
            }
            None => {
                cost += miss_cost;
                frame.dot_mut(k).position = estimate;
            }
        }
    }
    MotionFit {
        frame,
        matched,
        cost,
    }
}

/// Estimate a rigid motion for `prev` by sampling dot pairs.
///
/// On success returns the moved frame and the input dots it matched; the
/// caller claims them.
pub fn track_moving<R: Rng + ?Sized>(
    prev: &Frame,
    dots: &[Dot],
    index: &DotIndex,
    params: &TrackerParams,
    rng: &mut R,
) -> Option<(Frame, Vec<usize>)> {
    let mut targets: [Option<Vec<usize>>; DOTS_PER_FRAME] = std::array::from_fn(|_| None);
    let mut pool: Vec<usize> = (0..DOTS_PER_FRAME).collect();
    let mut best: Option<MotionFit> = None;

    'trials: for _ in 0..params.max_trials {
        // Move two dots that have movement targets to the front of the pool.
        for j in 0..2 {
            loop {
                if pool.len() < 2 {
                    break 'trials;
                }
                let choice = rng.gen_range(j..pool.len());
                let slot = pool[choice];
                let found = targets[slot].get_or_insert_with(|| {
                    index.valid_within(
                        dots,
                        prev.dot(slot).position,
                        params.movement_radius,
                        params.max_movement_targets,
                    )
                });
                if found.is_empty() {
                    pool.swap_remove(choice);
                    continue;
                }
                pool.swap(j, choice);
                break;
            }
        }

        let (a, b) = (pool[0], pool[1]);
        let (a_pre, b_pre) = (prev.dot(a).position, prev.dot(b).position);
        let pre_dist_sq = (b_pre - a_pre).norm_squared();
        let (Some(targets_a), Some(targets_b)) = (&targets[a], &targets[b]) else {
            continue;
        };

        for &ta in targets_a {
            for &tb in targets_b {
                let (a_post, b_post) = (dots[ta].position, dots[tb].position);
                let post_dist_sq = (b_post - a_post).norm_squared();
                if (post_dist_sq - pre_dist_sq).abs() >= params.pair_distance_tolerance {
                    continue;
                }
                let Some(motion) = rigid_motion_from_pairs(a_pre, a_post, b_pre, b_post) else {
                    continue;
                };
                let fit = evaluate_motion(prev, dots, index, &motion, params);
                if best.as_ref().is_none_or(|b| fit.cost < b.cost) {
                    best = Some(fit);
                }
            }
        }
    }

    let best = best?;
    if best.matched.len() < params.min_moving_matches {
        trace!(
            "moving fit rejected: {} matches, cost {:.1}",
            best.matched.len(),
            best.cost
        );
        return None;
    }
    let mut frame = best.frame;
    frame.detected_by = DetectedBy::Moving;
    Some((frame, best.matched))
}

/// Run both tracking passes over `prev`, pushing survivors into `sink`.
///
/// Previous frames without a decoded code are dropped untracked.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(prev = prev.len())))]
pub fn track_frames<R: Rng + ?Sized>(
    prev: &[Frame],
    dots: &mut [Dot],
    params: &TrackerParams,
    rng: &mut R,
    sink: &mut FrameSink,
) -> TrackOutcome {
    let index = DotIndex::new(dots);
    let mut outcome = TrackOutcome::default();
    let mut pending: Vec<&Frame> = Vec::new();

    for frame in prev {
        if sink.is_full() {
            break;
        }
        if !frame.has_code() {
            trace!("previous frame without a code skipped");
            outcome.dropped += 1;
            continue;
        }
        match track_stationary(frame, dots, &index, params) {
            Some(kept) => {
                sink.push(kept);
                outcome.stationary += 1;
            }
            None => pending.push(frame),
        }
    }

    for frame in pending {
        if sink.is_full() {
            break;
        }
        match track_moving(frame, dots, &index, params, rng) {
            Some((moved, matched)) => {
                for i in matched {
                    dots[i].valid = false;
                }
                sink.push(moved);
                outcome.moving += 1;
            }
            None => outcome.dropped += 1,
        }
    }

    debug!(
        "tracking: {} stationary, {} moving, {} dropped of {} previous frames",
        outcome.stationary,
        outcome.moving,
        outcome.dropped,
        prev.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{apply_motion, frame_dots, marker_frame, SyntheticFrame};
    use approx::assert_relative_eq;
    use dotframe_core::DotColor;
    use nalgebra::Vector2;
    use rand::rngs::StdRng;

    fn seeded() -> (TrackerParams, StdRng) {
        let params = TrackerParams {
            seed: Some(17),
            ..TrackerParams::default()
        };
        let rng = params.rng();
        (params, rng)
    }

    fn stray(x: f32, y: f32) -> Dot {
        Dot::new(Point2::new(x, y), Vector2::new(3.0, 3.0), DotColor::default())
    }

    #[test]
    fn unchanged_dots_keep_the_frame_in_place() {
        let layout = SyntheticFrame::default();
        let prev = marker_frame(42, &layout).expect("frame");
        let mut dots = frame_dots(42, &layout).expect("dots");
        let (params, mut rng) = seeded();
        let mut sink = FrameSink::new(4);

        let outcome = track_frames(&[prev], &mut dots, &params, &mut rng, &mut sink);
        assert_eq!(outcome.stationary, 1);
        let frame = sink.frames()[0];
        assert_eq!(frame.detected_by, DetectedBy::Stationary);
        assert_eq!(frame.code, Some(42));
        assert_eq!(frame.wedges, prev.wedges);
        assert!(dots.iter().all(|d| !d.valid));
    }

    #[test]
    fn six_matching_dots_are_enough_and_exactly_those_are_claimed() {
        let layout = SyntheticFrame::default();
        let prev = marker_frame(42, &layout).expect("frame");
        let all = frame_dots(42, &layout).expect("dots");

        let mut dots: Vec<Dot> = [0usize, 3, 7, 11, 14, 18]
            .iter()
            .map(|&i| {
                let mut d = all[i];
                d.position.x += 0.4;
                d
            })
            .collect();
        dots.push(stray(400.0, 400.0));
        dots.push(stray(135.0, 135.0));

        let index = DotIndex::new(&dots);
        let params = TrackerParams::default();
        let frame = track_stationary(&prev, &mut dots, &index, &params).expect("stationary");

        assert_eq!(frame.detected_by, DetectedBy::Stationary);
        assert_relative_eq!(frame.dot(3).position.x, all[3].position.x + 0.4);
        assert_eq!(frame.dot(4).position, all[4].position);
        assert!(dots[..6].iter().all(|d| !d.valid));
        assert!(dots[6..].iter().all(|d| d.valid));
    }

    #[test]
    fn too_few_stationary_matches_release_their_claims() {
        let layout = SyntheticFrame::default();
        let prev = marker_frame(42, &layout).expect("frame");
        let all = frame_dots(42, &layout).expect("dots");
        let mut dots: Vec<Dot> = all[..5].to_vec();

        let index = DotIndex::new(&dots);
        assert!(track_stationary(&prev, &mut dots, &index, &TrackerParams::default()).is_none());
        assert!(dots.iter().all(|d| d.valid));
    }

    #[test]
    fn rigidly_moved_marker_is_followed() {
        let layout = SyntheticFrame::default();
        let prev = marker_frame(42, &layout).expect("frame");
        let mut dots = frame_dots(42, &layout).expect("dots");

        let pivot = prev.center().coords.cast::<f64>();
        let motion = Homography::translation(-pivot)
            .then(&Homography::rotation(0.03))
            .then(&Homography::translation(pivot + nalgebra::Vector2::new(4.0, 3.0)));
        apply_motion(&mut dots, &motion);
        let expected = dots.clone();

        let (params, mut rng) = seeded();
        let mut sink = FrameSink::new(4);
        let outcome = track_frames(&[prev], &mut dots, &params, &mut rng, &mut sink);

        assert_eq!(outcome.stationary, 0);
        assert_eq!(outcome.moving, 1);
        let frame = sink.frames()[0];
        assert_eq!(frame.detected_by, DetectedBy::Moving);
        assert_eq!(frame.code, Some(42));
        assert_eq!(frame.wedges[1].colors(), prev.wedges[1].colors());
        for (k, want) in expected.iter().enumerate() {
            let got = frame.dot(k).position;
            assert!((got - want.position).norm() < 1.0, "dot {k}: {got:?} vs {want:?}");
        }
        assert!(dots.iter().all(|d| !d.valid));
    }

    #[test]
    fn previous_frame_without_code_is_not_carried() {
        let layout = SyntheticFrame::default();
        let mut prev = marker_frame(42, &layout).expect("frame");
        prev.code = None;
        let mut dots = frame_dots(42, &layout).expect("dots");
        let (params, mut rng) = seeded();
        let mut sink = FrameSink::new(4);

        let outcome = track_frames(&[prev], &mut dots, &params, &mut rng, &mut sink);
        assert_eq!(outcome.stationary, 0);
        assert_eq!(outcome.moving, 0);
        assert_eq!(outcome.dropped, 1);
        assert!(sink.is_empty());
        assert!(dots.iter().all(|d| d.valid));
    }

    #[test]
    fn vanished_marker_is_dropped() {
        let prev = marker_frame(42, &SyntheticFrame::default()).expect("frame");
        let mut dots = vec![stray(500.0, 500.0), stray(520.0, 500.0)];
        let (params, mut rng) = seeded();
        let mut sink = FrameSink::new(4);

        let outcome = track_frames(&[prev], &mut dots, &params, &mut rng, &mut sink);
        assert_eq!(outcome.dropped, 1);
        assert!(sink.is_empty());
        assert!(dots.iter().all(|d| d.valid));
    }

    #[test]
    fn nearest_valid_skips_claimed_dots() {
        let mut dots = vec![stray(0.0, 0.0), stray(2.0, 0.0)];
        let index = DotIndex::new(&dots);
        assert_eq!(index.nearest_valid(&dots, Point2::new(0.5, 0.0), 3.0), Some(0));
        dots[0].valid = false;
        assert_eq!(index.nearest_valid(&dots, Point2::new(0.5, 0.0), 3.0), Some(1));
        assert_eq!(index.nearest_valid(&dots, Point2::new(0.5, 0.0), 1.0), None);
    }
}
