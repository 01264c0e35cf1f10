use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Planar projective transform acting on homogeneous image points.
///
/// Rigid motions used by the tracker are stored the same way; their last row
/// is `[0, 0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn translation(t: Vector2<f64>) -> Self {
        Self::new(Matrix3::new(
            1.0, 0.0, t.x, //
            0.0, 1.0, t.y, //
            0.0, 0.0, 1.0,
        ))
    }

    /// Counter-clockwise rotation about the origin (y-up convention).
    pub fn rotation(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(Matrix3::new(
            c, -s, 0.0, //
            s, c, 0.0, //
            0.0, 0.0, 1.0,
        ))
    }

    /// `self` applied first, then `next`.
    pub fn then(&self, next: &Homography) -> Self {
        Self::new(next.h * self.h)
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Rigid motion (rotation + translation, no scale) that maps the segment
/// `a_pre -> b_pre` onto the direction of `a_post -> b_post`, with the segment
/// midpoints coinciding.
///
/// Returns `None` when either segment is degenerate.
pub fn rigid_motion_from_pairs(
    a_pre: Point2<f32>,
    a_post: Point2<f32>,
    b_pre: Point2<f32>,
    b_post: Point2<f32>,
) -> Option<Homography> {
    let d_pre = (b_pre - a_pre).cast::<f64>();
    let d_post = (b_post - a_post).cast::<f64>();
    if d_pre.norm_squared() < 1e-12 || d_post.norm_squared() < 1e-12 {
        return None;
    }

    let angle_pre = d_pre.y.atan2(d_pre.x);
    let angle_post = d_post.y.atan2(d_post.x);
    let mid_pre = nalgebra::center(&a_pre, &b_pre).coords.cast::<f64>();
    let mid_post = nalgebra::center(&a_post, &b_post).coords.cast::<f64>();

    let motion = Homography::translation(-mid_pre)
        .then(&Homography::rotation(angle_post - angle_pre))
        .then(&Homography::translation(mid_post));
    Some(motion)
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn normalize_points4(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let centroid = pts
        .iter()
        .fold(Vector2::<f64>::zeros(), |acc, p| acc + p.coords.cast::<f64>())
        / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.coords.cast::<f64>() - centroid).norm())
        .sum::<f64>()
        / 4.0;

    let t = hartley_normalization(centroid.x, centroid.y, mean_dist);
    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let x = a.lu().solve(&b)?;
    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = t_dst.try_inverse()? * hn * t_src;
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected ({:.4},{:.4}) ~ ({:.4},{:.4}) within {}",
            a.x,
            a.y,
            b.x,
            b.y,
            tol
        );
    }

    #[test]
    fn rigid_motion_maps_both_points() {
        let a_pre = Point2::new(10.0_f32, 20.0);
        let b_pre = Point2::new(40.0_f32, 20.0);
        let motion = Homography::rotation(0.3).then(&Homography::translation(Vector2::new(5.0, -7.0)));
        let a_post = motion.apply(a_pre);
        let b_post = motion.apply(b_pre);

        let est = rigid_motion_from_pairs(a_pre, a_post, b_pre, b_post).expect("non-degenerate");
        assert_close(est.apply(a_pre), a_post, 1e-3);
        assert_close(est.apply(b_pre), b_post, 1e-3);
        let probe = Point2::new(-3.0_f32, 11.0);
        assert_close(est.apply(probe), motion.apply(probe), 1e-3);
    }

    #[test]
    fn rigid_motion_rejects_coincident_points() {
        let p = Point2::new(1.0_f32, 1.0);
        assert!(rigid_motion_from_pairs(p, p, p, Point2::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn four_point_homography_recovers_projective_map() {
        let ground_truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 130.0),
            Point2::new(0.0, 130.0),
        ];
        let dst = rect.map(|p| ground_truth.apply(p));
        let recovered = homography_from_4pt(&rect, &dst).expect("recoverable");
        for p in [Point2::new(60.0_f32, 40.0), Point2::new(150.0, 120.0)] {
            assert_close(recovered.apply(p), ground_truth.apply(p), 1e-2);
        }
        let inv = recovered.inverse().expect("invertible");
        assert_close(inv.apply(dst[2]), rect[2], 1e-2);
    }
}
