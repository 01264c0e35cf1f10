//! Core types and utilities for colored-dot frame detection.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete blob detector: dots arrive as plain values with a
//! position, an elliptical radius and a Lab-like color.

mod dot;
mod frame;
mod geometry;
mod homography;
mod logger;

pub use dot::{Dot, DotColor};
pub use frame::{
    DetectedBy, Frame, Wedge, CORNER_INDEX, DOTS_PER_FRAME, DOTS_PER_WEDGE, WEDGES_PER_FRAME,
};
pub use geometry::{angle_diff_abs, is_turn_near, lerp, turn_angle};
pub use homography::{homography_from_4pt, rigid_motion_from_pairs, Homography};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
