use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Dot color in a perceptually uniform Lab-like space.
///
/// Only the chromatic `a`/`b` channels take part in decoding; `l` is carried
/// along for consumers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DotColor {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl DotColor {
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared distance in the `(a, b)` plane.
    #[inline]
    pub fn chroma_dist_sq(&self, other: &DotColor) -> f32 {
        let da = self.a - other.a;
        let db = self.b - other.b;
        da * da + db * db
    }
}

fn default_valid() -> bool {
    true
}

/// A colored blob reported by the upstream dot detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    /// Blob center in image coordinates.
    pub position: Point2<f32>,
    /// Elliptical half-extents along x and y.
    pub radius: Vector2<f32>,
    pub color: DotColor,
    /// Cleared once the dot has been claimed by a frame (or was never usable).
    #[serde(default = "default_valid")]
    pub valid: bool,
}

impl Dot {
    pub fn new(position: Point2<f32>, radius: Vector2<f32>, color: DotColor) -> Self {
        Self {
            position,
            radius,
            color,
            valid: true,
        }
    }

    /// Larger of the two half-extents.
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.radius.x.max(self.radius.y)
    }

    #[inline]
    pub fn dist_sq(&self, p: Point2<f32>) -> f32 {
        (self.position - p).norm_squared()
    }
}
