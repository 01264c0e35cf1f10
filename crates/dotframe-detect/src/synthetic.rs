//! Ideal marker dots for tests, benches and offline experiments.
//!
//! A marker is a square with one wedge per corner. Walking the corners in
//! wedge order turns by +90° at each corner, and each wedge's arms point
//! along the two square sides that meet there.

use dotframe_code::{encode_frame_code, ColorClass, Code240};
use dotframe_core::{
    DetectedBy, Dot, Frame, Homography, Wedge, DOTS_PER_FRAME, DOTS_PER_WEDGE, WEDGES_PER_FRAME,
};
use nalgebra::{Point2, Rotation2, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Placement of a synthetic marker in image coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyntheticFrame {
    /// Image position of wedge 0's corner.
    pub origin: Point2<f32>,
    /// Corner-to-corner side length.
    pub side: f32,
    /// Rotation about `origin`, radians.
    pub angle: f32,
    /// Distance between consecutive dots along an arm.
    pub dot_spacing: f32,
    pub dot_radius: f32,
}

impl Default for SyntheticFrame {
    fn default() -> Self {
        Self {
            origin: Point2::new(100.0, 100.0),
            side: 70.0,
            angle: 0.0,
            dot_spacing: 10.0,
            dot_radius: 3.0,
        }
    }
}

impl SyntheticFrame {
    /// Corner positions in wedge order.
    pub fn corners(&self) -> [Point2<f32>; WEDGES_PER_FRAME] {
        let rot = Rotation2::new(self.angle);
        let s = self.side;
        [(0.0, 0.0), (s, 0.0), (s, s), (0.0, s)]
            .map(|(x, y)| self.origin + rot * Vector2::new(x, y))
    }
}

/// The 20 dots of marker `code`, wedge-major in decode order.
///
/// Returns `None` for codes outside the id range.
pub fn frame_dots(code: u32, layout: &SyntheticFrame) -> Option<Vec<Dot>> {
    let wedge_codes = encode_frame_code(code)?;
    let table = Code240::get();
    let corners = layout.corners();
    let sp = layout.dot_spacing;
    let radius = Vector2::new(layout.dot_radius, layout.dot_radius);

    let mut dots = Vec::with_capacity(DOTS_PER_FRAME);
    for (k, &wedge_code) in wedge_codes.iter().enumerate() {
        let pattern = table.pattern(wedge_code)?;
        let prev = corners[(k + WEDGES_PER_FRAME - 1) % WEDGES_PER_FRAME];
        let next = corners[(k + 1) % WEDGES_PER_FRAME];
        let corner = corners[k];
        let u_in = (corner - prev).normalize();
        let u_out = (next - corner).normalize();

        let positions = [
            corner - u_in * (2.0 * sp),
            corner - u_in * sp,
            corner,
            corner + u_out * sp,
            corner + u_out * (2.0 * sp),
        ];
        for (p, digit) in positions.into_iter().zip(pattern) {
            let color = ColorClass::from_digit(digit)?.reference_color();
            dots.push(Dot::new(p, radius, color));
        }
    }
    Some(dots)
}

/// Marker `code` as a decoded frame with its wedges in decode order.
pub fn marker_frame(code: u32, layout: &SyntheticFrame) -> Option<Frame> {
    let dots = frame_dots(code, layout)?;
    let wedges: [Wedge; WEDGES_PER_FRAME] = std::array::from_fn(|k| {
        Wedge::new(std::array::from_fn(|j| dots[k * DOTS_PER_WEDGE + j]))
    });
    let mut frame = Frame::new(wedges, DetectedBy::Scratch);
    frame.code = Some(code);
    Some(frame)
}

/// Move every dot by `motion`.
pub fn apply_motion(dots: &mut [Dot], motion: &Homography) {
    for dot in dots {
        dot.position = motion.apply(dot.position);
    }
}

/// `count` isolated dots with random colors inside `min..max`.
///
/// Dots are kept at least `min_gap` apart so they do not form chains.
pub fn clutter_dots(
    count: usize,
    min: Point2<f32>,
    max: Point2<f32>,
    min_gap: f32,
    seed: u64,
) -> Vec<Dot> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut dots: Vec<Dot> = Vec::with_capacity(count);
    let max_attempts = count.saturating_mul(50);
    let mut attempts = 0;
    while dots.len() < count && attempts < max_attempts {
        attempts += 1;
        let p = Point2::new(rng.gen_range(min.x..max.x), rng.gen_range(min.y..max.y));
        if dots.iter().any(|d| d.dist_sq(p) < min_gap * min_gap) {
            continue;
        }
        let class = ColorClass::ALL[rng.gen_range(0..ColorClass::ALL.len())];
        dots.push(Dot::new(p, Vector2::new(3.0, 3.0), class.reference_color()));
    }
    dots
}
