//! Wedges: two perpendicular 3-dot arms sharing a corner dot.

use dotframe_core::{is_turn_near, CORNER_INDEX, DOTS_PER_WEDGE};
use log::{trace, warn};
use std::f64::consts::FRAC_PI_2;

use crate::graph::DotGraph;
use crate::params::WedgeParams;

/// Wedge over graph dots, plus the links used while assembling frames.
///
/// Dot order is `[far_in, near_in, corner, near_out, far_out]`, oriented so
/// that `far_in -> corner -> far_out` turns by +90°.
#[derive(Clone, Debug, PartialEq)]
pub struct WedgeNode {
    pub dots: [usize; DOTS_PER_WEDGE],
    /// Wedges whose incoming arm continues this wedge's outgoing arm.
    pub connections: Vec<usize>,
    /// Two-step chains `self -> w2 -> w3` with both indices above `self`.
    pub chains: Vec<[usize; 2]>,
    /// Two-step returns `self -> w4 -> w1` with `w1` below both.
    pub closings: Vec<[usize; 2]>,
    pub used_by_frame: bool,
}

impl WedgeNode {
    pub fn new(dots: [usize; DOTS_PER_WEDGE]) -> Self {
        Self {
            dots,
            connections: Vec::new(),
            chains: Vec::new(),
            closings: Vec::new(),
            used_by_frame: false,
        }
    }

    #[inline]
    pub fn corner(&self) -> usize {
        self.dots[CORNER_INDEX]
    }

    pub fn shares_dot(&self, other: &WedgeNode) -> bool {
        self.dots.iter().any(|d| other.dots.contains(d))
    }

    /// Same dots, no links, not used.
    pub fn detached(&self) -> Self {
        Self::new(self.dots)
    }
}

fn all_distinct(dots: &[usize; DOTS_PER_WEDGE]) -> bool {
    (0..DOTS_PER_WEDGE).all(|i| !dots[i + 1..].contains(&dots[i]))
}

/// Enumerate wedges at every corner candidate, sorted by corner x.
///
/// Generation stops as soon as more than `params.max_wedges` wedges exist.
pub fn build_wedges(graph: &DotGraph, params: &WedgeParams) -> Vec<WedgeNode> {
    let tolerance = params.corner_tolerance_deg.to_radians();
    let mut wedges: Vec<WedgeNode> = Vec::new();

    'corners: for corner in 0..graph.len() {
        let pc = graph.position(corner);
        let pairs = &graph.dots[corner].neighbor_pairs;
        for (k, p1) in pairs.iter().enumerate() {
            for p2 in &pairs[k + 1..] {
                let (f1, f2) = (graph.position(p1.far), graph.position(p2.far));
                let dots = if is_turn_near(f1, pc, f2, FRAC_PI_2, tolerance) {
                    [p1.far, p1.near, corner, p2.near, p2.far]
                } else if is_turn_near(f1, pc, f2, -FRAC_PI_2, tolerance) {
                    [p2.far, p2.near, corner, p1.near, p1.far]
                } else {
                    continue;
                };
                if !all_distinct(&dots) {
                    continue;
                }
                wedges.push(WedgeNode::new(dots));
                if wedges.len() > params.max_wedges {
                    warn!(
                        "wedge limit {} exceeded, remaining corners skipped",
                        params.max_wedges
                    );
                    break 'corners;
                }
            }
        }
    }

    wedges.sort_by(|a, b| {
        graph
            .position(a.corner())
            .x
            .total_cmp(&graph.position(b.corner()).x)
    });
    trace!("built {} wedges", wedges.len());
    wedges
}
