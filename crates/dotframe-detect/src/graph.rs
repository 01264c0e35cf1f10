//! Neighbor graph over the valid input dots.
//!
//! Dots are kept in an arena sorted by x so a sweep can cut off the neighbor
//! search early. Every dot also collects *neighbor pairs*: `(near, far)` such
//! that `self -> near -> far` is a straight 3-dot chain.

use dotframe_core::{is_turn_near, Dot};
use log::debug;
use nalgebra::{Point2, Vector2};

use crate::params::GraphParams;

/// A straight chain `root -> near -> far` seen from `root`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NeighborPair {
    pub near: usize,
    pub far: usize,
}

/// Arena node; all links are indices into [`DotGraph::dots`].
#[derive(Clone, Debug)]
pub struct GraphDot {
    pub position: Point2<f64>,
    pub radius: Vector2<f64>,
    /// Index of this dot in the caller's slice.
    pub source: usize,
    pub neighbors: Vec<usize>,
    pub neighbor_pairs: Vec<NeighborPair>,
    /// Size of the accepted frame that claimed this dot, `+inf` if unclaimed.
    pub used_at_size: f64,
}

impl GraphDot {
    fn from_dot(source: usize, dot: &Dot) -> Self {
        Self {
            position: dot.position.cast::<f64>(),
            radius: dot.radius.cast::<f64>(),
            source,
            neighbors: Vec::new(),
            neighbor_pairs: Vec::new(),
            used_at_size: f64::INFINITY,
        }
    }

    #[inline]
    fn max_radius(&self) -> f64 {
        self.radius.x.max(self.radius.y)
    }

    /// True once an accepted frame no larger than `size` owns this dot.
    #[inline]
    pub fn is_claimed_within(&self, size: f64) -> bool {
        self.used_at_size <= size
    }

    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.used_at_size.is_finite()
    }
}

#[derive(Clone, Debug, Default)]
pub struct DotGraph {
    pub dots: Vec<GraphDot>,
}

impl DotGraph {
    /// Build the graph from the dots whose `valid` flag is set.
    pub fn new(dots: &[Dot], params: &GraphParams) -> Self {
        let mut nodes: Vec<GraphDot> = dots
            .iter()
            .enumerate()
            .filter(|(_, d)| d.valid)
            .map(|(i, d)| GraphDot::from_dot(i, d))
            .collect();
        nodes.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        let mut graph = Self { dots: nodes };
        let edges = graph.link_neighbors(params);
        let pairs = graph.collect_neighbor_pairs(params);
        debug!(
            "dot graph: {} dots, {} neighbor edges, {} neighbor pairs",
            graph.dots.len(),
            edges,
            pairs
        );
        graph
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    #[inline]
    pub fn position(&self, index: usize) -> Point2<f64> {
        self.dots[index].position
    }

    fn link_neighbors(&mut self, params: &GraphParams) -> usize {
        let n = self.dots.len();
        let mut edges = 0;
        for i in 0..n {
            let (pi, ri) = (self.dots[i].position, self.dots[i].radius);
            let max_ri = self.dots[i].max_radius();
            for j in (i + 1)..n {
                let dx = self.dots[j].position.x - pi.x;
                if dx > params.sweep_radius_factor * ri.x {
                    break;
                }
                let dy = self.dots[j].position.y - pi.y;
                if dy.abs() >= params.sweep_radius_factor * ri.y {
                    continue;
                }
                let limit = params.neighbor_radius_factor * (max_ri + self.dots[j].max_radius());
                if dx * dx + dy * dy < limit * limit {
                    self.dots[i].neighbors.push(j);
                    self.dots[j].neighbors.push(i);
                    edges += 1;
                }
            }
        }
        edges
    }

    fn collect_neighbor_pairs(&mut self, params: &GraphParams) -> usize {
        let tolerance = params.straight_tolerance_deg.to_radians();
        let mut found: Vec<(usize, NeighborPair)> = Vec::new();

        for mid in 0..self.dots.len() {
            let neighbors = &self.dots[mid].neighbors;
            let pm = self.dots[mid].position;
            for (k, &a) in neighbors.iter().enumerate() {
                for &c in &neighbors[k + 1..] {
                    let (pa, pc) = (self.dots[a].position, self.dots[c].position);
                    if is_turn_near(pa, pm, pc, 0.0, tolerance) {
                        found.push((a, NeighborPair { near: mid, far: c }));
                        found.push((c, NeighborPair { near: mid, far: a }));
                    }
                }
            }
        }

        let count = found.len();
        for (root, pair) in found {
            self.dots[root].neighbor_pairs.push(pair);
        }
        count
    }
}
