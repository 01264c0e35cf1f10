use dotframe_code::DecodeParams;
use dotframe_core::DOTS_PER_FRAME;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::DotFrameError;

/// Neighbor graph construction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphParams {
    /// Sweep window half-width in units of the left dot's radius.
    pub sweep_radius_factor: f64,
    /// Two dots are neighbors when closer than this factor times the sum of
    /// their larger half-extents.
    pub neighbor_radius_factor: f64,
    /// Max deviation from a straight line for a 3-dot chain.
    pub straight_tolerance_deg: f64,
}

impl Default for GraphParams {
    fn default() -> Self {
        Self {
            sweep_radius_factor: 8.0,
            neighbor_radius_factor: 2.0,
            straight_tolerance_deg: 30.0,
        }
    }
}

/// Wedge construction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WedgeParams {
    /// Max deviation of the corner turn from ±90°.
    pub corner_tolerance_deg: f64,
    /// Wedge generation stops (with a warning) once this many are exceeded.
    pub max_wedges: usize,
}

impl Default for WedgeParams {
    fn default() -> Self {
        Self {
            corner_tolerance_deg: 30.0,
            max_wedges: 9000,
        }
    }
}

/// Wedge chaining and frame assembly.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssemblyParams {
    /// Max deviation from straight where one wedge's arm runs into the next.
    pub connection_tolerance_deg: f64,
    /// Corner-to-corner search range of the first pass.
    pub first_pass_range: f64,
    /// Search range of the second pass over leftover wedges.
    pub second_pass_range: f64,
}

impl Default for AssemblyParams {
    fn default() -> Self {
        Self {
            connection_tolerance_deg: 10.0,
            first_pass_range: 150.0,
            second_pass_range: 10_000.0,
        }
    }
}

/// Physical frame size estimation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SizingParams {
    /// Real-world distance from a wedge corner to the far dot of its arm.
    pub reference_distance: f32,
    /// A new estimate replaces the stored size only if it differs by more
    /// than this.
    pub hysteresis: f32,
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            reference_distance: 1.5,
            hysteresis: 0.3,
        }
    }
}

/// Temporal tracking of frames from the previous invocation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerParams {
    /// Match radius for the stationary pass.
    pub stationary_radius: f32,
    /// A stationary frame needs at least this many of its 20 dots matched.
    pub min_stationary_matches: usize,
    /// Radius in which movement targets of a previous dot are collected.
    pub movement_radius: f32,
    /// Max movement targets kept per previous dot.
    pub max_movement_targets: usize,
    /// Match radius for dots of a transformed frame.
    pub moving_search_radius: f32,
    /// Two target dots qualify when their squared separation differs from the
    /// sampled pair's by less than this.
    pub pair_distance_tolerance: f32,
    /// Fraction by which a matched estimate is pulled onto its match.
    pub nudge: f32,
    /// Randomized trials per frame in the moving pass.
    pub max_trials: usize,
    /// A moving frame needs at least this many of its 20 dots matched.
    pub min_moving_matches: usize,
    /// Seed for the moving pass; `None` draws from OS entropy per call.
    pub seed: Option<u64>,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            stationary_radius: 1.0,
            min_stationary_matches: 6,
            movement_radius: 20.0,
            max_movement_targets: 4,
            moving_search_radius: 6.0,
            pair_distance_tolerance: 10.0,
            nudge: 0.25,
            max_trials: 1000,
            min_moving_matches: 5,
            seed: None,
        }
    }
}

impl TrackerParams {
    /// Random source for one invocation.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Parameters of the full per-frame update.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DetectorParams {
    #[serde(default)]
    pub graph: GraphParams,
    #[serde(default)]
    pub wedge: WedgeParams,
    #[serde(default)]
    pub assembly: AssemblyParams,
    #[serde(default)]
    pub decode: DecodeParams,
    #[serde(default)]
    pub sizing: SizingParams,
    #[serde(default)]
    pub tracker: TrackerParams,
    /// Skip the tracker and always reconstruct from scratch.
    #[serde(default)]
    pub disable_tracking: bool,
    /// Log per-stage timings at `debug` level.
    #[serde(default)]
    pub debug_timings: bool,
}

fn check(ok: bool, name: &'static str, reason: &'static str) -> Result<(), DotFrameError> {
    if ok {
        Ok(())
    } else {
        Err(DotFrameError::InvalidParams { name, reason })
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn angle(v: f64) -> bool {
    v.is_finite() && v > 0.0 && v <= 180.0
}

impl DetectorParams {
    /// Reject settings that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<(), DotFrameError> {
        let g = &self.graph;
        check(positive(g.sweep_radius_factor), "graph.sweep_radius_factor", "must be > 0")?;
        check(
            positive(g.neighbor_radius_factor),
            "graph.neighbor_radius_factor",
            "must be > 0",
        )?;
        check(
            angle(g.straight_tolerance_deg),
            "graph.straight_tolerance_deg",
            "must be in (0, 180]",
        )?;

        let w = &self.wedge;
        check(
            angle(w.corner_tolerance_deg),
            "wedge.corner_tolerance_deg",
            "must be in (0, 180]",
        )?;
        check(w.max_wedges > 0, "wedge.max_wedges", "must be > 0")?;

        let a = &self.assembly;
        check(
            angle(a.connection_tolerance_deg),
            "assembly.connection_tolerance_deg",
            "must be in (0, 180]",
        )?;
        check(positive(a.first_pass_range), "assembly.first_pass_range", "must be > 0")?;
        check(positive(a.second_pass_range), "assembly.second_pass_range", "must be > 0")?;

        let s = &self.sizing;
        check(
            positive(s.reference_distance as f64),
            "sizing.reference_distance",
            "must be > 0",
        )?;
        check(s.hysteresis >= 0.0, "sizing.hysteresis", "must be >= 0")?;

        let t = &self.tracker;
        check(positive(t.stationary_radius as f64), "tracker.stationary_radius", "must be > 0")?;
        check(positive(t.movement_radius as f64), "tracker.movement_radius", "must be > 0")?;
        check(
            positive(t.moving_search_radius as f64),
            "tracker.moving_search_radius",
            "must be > 0",
        )?;
        check(
            (0.0..=1.0).contains(&t.nudge),
            "tracker.nudge",
            "must be in [0, 1]",
        )?;
        check(
            (1..=DOTS_PER_FRAME).contains(&t.min_stationary_matches),
            "tracker.min_stationary_matches",
            "must be in [1, 20]",
        )?;
        check(
            (1..=DOTS_PER_FRAME).contains(&t.min_moving_matches),
            "tracker.min_moving_matches",
            "must be in [1, 20]",
        )?;
        check(
            t.max_movement_targets > 0,
            "tracker.max_movement_targets",
            "must be > 0",
        )?;
        Ok(())
    }
}
