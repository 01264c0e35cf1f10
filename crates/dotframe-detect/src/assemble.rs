//! Chaining wedges into closed 4-cycles.
//!
//! Wedge `w1` connects to `w2` when `w1`'s outgoing arm runs straight into
//! `w2`'s incoming arm. A frame is a cycle `w1 -> w2 -> w3 -> w4 -> w1` with
//! `w1` the lowest index; it is found by joining two-step chains from `w1`
//! with two-step returns into `w1`.

use dotframe_core::{is_turn_near, WEDGES_PER_FRAME};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::graph::DotGraph;
use crate::params::AssemblyParams;
use crate::wedges::WedgeNode;

/// A closed cycle of four wedges, indices into the wedge list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameCandidate {
    pub wedges: [usize; WEDGES_PER_FRAME],
    /// Bounding-box width plus height of the four corners.
    pub frame_size: f64,
}

/// True if `from`'s outgoing arm continues straight into `to`'s incoming arm.
pub fn wedges_connect(graph: &DotGraph, from: &WedgeNode, to: &WedgeNode, tolerance: f64) -> bool {
    if from.shares_dot(to) {
        return false;
    }
    let a = graph.position(from.dots[2]);
    let b = graph.position(from.dots[4]);
    let c = graph.position(to.dots[0]);
    let d = graph.position(to.dots[2]);
    is_turn_near(a, b, c, 0.0, tolerance) && is_turn_near(b, c, d, 0.0, tolerance)
}

/// Fill `connections` of every wedge, searching corners within `range`.
///
/// Wedges must be sorted by corner x. Returns the number of connections.
pub fn link_wedges(graph: &DotGraph, wedges: &mut [WedgeNode], range: f64, tolerance: f64) -> usize {
    let n = wedges.len();
    let mut links: Vec<Vec<usize>> = vec![Vec::new(); n];

    for (w1, out) in links.iter_mut().enumerate() {
        let c1 = graph.position(wedges[w1].corner());
        let in_range = |w2: usize| {
            let c2 = graph.position(wedges[w2].corner());
            (c2.y - c1.y).abs() < range
        };

        for w2 in (w1 + 1)..n {
            if graph.position(wedges[w2].corner()).x - c1.x > range {
                break;
            }
            if in_range(w2) && wedges_connect(graph, &wedges[w1], &wedges[w2], tolerance) {
                out.push(w2);
            }
        }
        for w2 in (0..w1).rev() {
            if c1.x - graph.position(wedges[w2].corner()).x > range {
                break;
            }
            if in_range(w2) && wedges_connect(graph, &wedges[w1], &wedges[w2], tolerance) {
                out.push(w2);
            }
        }
    }

    let mut total = 0;
    for (wedge, out) in wedges.iter_mut().zip(links) {
        total += out.len();
        wedge.connections = out;
    }
    total
}

/// Fill `chains` and `closings` from the connections.
pub fn link_chains(wedges: &mut [WedgeNode]) {
    let n = wedges.len();
    let mut chains: Vec<Vec<[usize; 2]>> = vec![Vec::new(); n];
    let mut closings: Vec<Vec<[usize; 2]>> = vec![Vec::new(); n];

    for w1 in 0..n {
        for &w2 in &wedges[w1].connections {
            if w2 <= w1 {
                continue;
            }
            for &w3 in &wedges[w2].connections {
                if w3 > w1 {
                    chains[w1].push([w2, w3]);
                }
            }
        }
    }

    for w3 in 0..n {
        for &w4 in &wedges[w3].connections {
            for &w1 in &wedges[w4].connections {
                if w1 < w3 && w1 < w4 {
                    closings[w3].push([w4, w1]);
                }
            }
        }
    }

    for ((wedge, c), r) in wedges.iter_mut().zip(chains).zip(closings) {
        wedge.chains = c;
        wedge.closings = r;
    }
}

fn corners_extent(graph: &DotGraph, wedges: &[WedgeNode], cycle: &[usize; 4]) -> f64 {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &w in cycle {
        let p = graph.position(wedges[w].corner());
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x) + (max_y - min_y)
}

/// All closed 4-cycles, smallest first.
///
/// The four wedges of a candidate are pairwise dot-disjoint.
pub fn collect_candidates(graph: &DotGraph, wedges: &[WedgeNode]) -> Vec<FrameCandidate> {
    let mut candidates = Vec::new();
    for (w1, wedge) in wedges.iter().enumerate() {
        for &[w2, w3] in &wedge.chains {
            for &[w4, back] in &wedges[w3].closings {
                if back != w1 || w4 == w2 {
                    continue;
                }
                if wedges[w1].shares_dot(&wedges[w3]) || wedges[w2].shares_dot(&wedges[w4]) {
                    continue;
                }
                let cycle = [w1, w2, w3, w4];
                candidates.push(FrameCandidate {
                    wedges: cycle,
                    frame_size: corners_extent(graph, wedges, &cycle),
                });
            }
        }
    }
    candidates.sort_by(|a, b| a.frame_size.total_cmp(&b.frame_size));
    candidates
}

/// Link `wedges` within `range` and return the frame candidates they close.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(wedges = wedges.len())))]
pub fn assemble_candidates(
    graph: &DotGraph,
    wedges: &mut [WedgeNode],
    params: &AssemblyParams,
    range: f64,
) -> Vec<FrameCandidate> {
    let tolerance = params.connection_tolerance_deg.to_radians();
    let connections = link_wedges(graph, wedges, range, tolerance);
    link_chains(wedges);
    let candidates = collect_candidates(graph, wedges);
    debug!(
        "assembly (range {range}): {} wedges, {} connections, {} candidates",
        wedges.len(),
        connections,
        candidates.len()
    );
    candidates
}
