//! Physical frame size from the known arm length.
//!
//! Each side of the frame is seen from both of its end wedges. The ratio of
//! the corner-to-corner distance to the corner-to-far-dot distance of an arm,
//! times the real arm length, estimates the side length.

use dotframe_core::Frame;
use nalgebra::Point2;

use crate::params::SizingParams;

fn side_estimate(
    corner: Point2<f32>,
    arm_end: Point2<f32>,
    other: Point2<f32>,
    reference: f32,
) -> Option<f32> {
    let arm = (arm_end - corner).norm();
    if arm <= f32::EPSILON {
        return None;
    }
    Some((other - corner).norm() * reference / arm)
}

/// Width and height estimates for `frame`, `None` for degenerate arms.
pub fn estimate_frame_size(frame: &Frame, params: &SizingParams) -> Option<(f32, f32)> {
    let r = params.reference_distance;
    let c = frame.corners();
    let w = &frame.wedges;

    let width = 0.25
        * (side_estimate(c[0], w[0].dots[4].position, c[1], r)?
            + side_estimate(c[1], w[1].dots[0].position, c[0], r)?
            + side_estimate(c[2], w[2].dots[4].position, c[3], r)?
            + side_estimate(c[3], w[3].dots[0].position, c[2], r)?);
    let height = 0.25
        * (side_estimate(c[1], w[1].dots[4].position, c[2], r)?
            + side_estimate(c[2], w[2].dots[0].position, c[1], r)?
            + side_estimate(c[3], w[3].dots[4].position, c[0], r)?
            + side_estimate(c[0], w[0].dots[0].position, c[3], r)?);
    Some((width, height))
}

/// Update `frame.width`/`height` when the estimate moved past the hysteresis.
pub fn size_frame(frame: &mut Frame, params: &SizingParams) {
    let Some((width, height)) = estimate_frame_size(frame, params) else {
        return;
    };
    if (width - frame.width).abs() > params.hysteresis {
        frame.width = width;
    }
    if (height - frame.height).abs() > params.hysteresis {
        frame.height = height;
    }
}
