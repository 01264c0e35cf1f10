//! Angle helpers shared by the graph, wedge and connection stages.
//!
//! All angles are radians. A "turn" is the signed change of heading when
//! walking `a -> b -> c`, normalized into `[0, 2π)`.

use nalgebra::Point2;
use std::f64::consts::{PI, TAU};

/// Heading change when walking `a -> b -> c`, in `[0, 2π)`.
///
/// Straight continuation is `0`, a left turn in a y-up frame is `π/2`.
pub fn turn_angle(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let th1 = (b.y - a.y).atan2(b.x - a.x);
    let th2 = (c.y - b.y).atan2(c.x - b.x);
    (th2 - th1).rem_euclid(TAU)
}

/// Unsigned difference between two angles, in `[0, π]`.
pub fn angle_diff_abs(a: f64, b: f64) -> f64 {
    let diff = (b - a).rem_euclid(TAU);
    if diff <= PI {
        diff
    } else {
        TAU - diff
    }
}

/// True if the turn `a -> b -> c` is within `tolerance` of `target`.
#[inline]
pub fn is_turn_near(
    a: Point2<f64>,
    b: Point2<f64>,
    c: Point2<f64>,
    target: f64,
    tolerance: f64,
) -> bool {
    angle_diff_abs(turn_angle(a, b, c), target) < tolerance
}

/// Linear interpolation `p + t (q - p)`.
#[inline]
pub fn lerp(p: Point2<f32>, q: Point2<f32>, t: f32) -> Point2<f32> {
    p + (q - p) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn straight_walk_has_zero_turn() {
        assert_relative_eq!(turn_angle(p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)), 0.0);
    }

    #[test]
    fn left_and_right_turns() {
        let left = turn_angle(p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0));
        let right = turn_angle(p(0.0, 0.0), p(1.0, 0.0), p(1.0, -1.0));
        assert_relative_eq!(left, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(right, 3.0 * FRAC_PI_2, epsilon = 1e-12);
        assert!(is_turn_near(
            p(0.0, 0.0),
            p(1.0, 0.0),
            p(1.0, -1.0),
            -FRAC_PI_2,
            1e-6
        ));
    }

    #[test]
    fn angle_difference_wraps() {
        assert_relative_eq!(angle_diff_abs(0.1, TAU - 0.1), 0.2, epsilon = 1e-12);
        assert_relative_eq!(angle_diff_abs(0.0, PI), PI);
        assert_relative_eq!(angle_diff_abs(-FRAC_PI_2, 3.0 * FRAC_PI_2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lerp_quarter_way() {
        let q = lerp(Point2::new(0.0, 0.0), Point2::new(4.0, 8.0), 0.25);
        assert_eq!(q, Point2::new(1.0, 2.0));
    }
}
