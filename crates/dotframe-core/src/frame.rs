use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{homography_from_4pt, Dot, DotColor, Homography};

pub const DOTS_PER_WEDGE: usize = 5;
pub const WEDGES_PER_FRAME: usize = 4;
pub const DOTS_PER_FRAME: usize = DOTS_PER_WEDGE * WEDGES_PER_FRAME;
/// Index of the pivot dot inside a wedge.
pub const CORNER_INDEX: usize = 2;

/// Five dots forming two perpendicular arms that meet at `dots[2]`.
///
/// `dots[0..=2]` is the incoming arm (far, near, corner), `dots[2..=4]` the
/// outgoing arm (corner, near, far).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wedge {
    pub dots: [Dot; DOTS_PER_WEDGE],
}

impl Wedge {
    pub fn new(dots: [Dot; DOTS_PER_WEDGE]) -> Self {
        Self { dots }
    }

    #[inline]
    pub fn corner(&self) -> &Dot {
        &self.dots[CORNER_INDEX]
    }

    pub fn colors(&self) -> [DotColor; DOTS_PER_WEDGE] {
        self.dots.map(|d| d.color)
    }
}

/// How a frame was obtained in the current invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectedBy {
    /// Carried over from the previous invocation with its dots in place.
    Stationary,
    /// Carried over through an estimated rigid motion.
    Moving,
    /// Reconstructed from dots.
    Scratch,
}

/// A closed quadrilateral of four wedges carrying a decoded id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Wedges in decode order: `wedges[0]` carries the checksum digit.
    pub wedges: [Wedge; WEDGES_PER_FRAME],
    pub detected_by: DetectedBy,
    /// Decoded id in `[0, 120^3)`, `None` if the checksum did not hold.
    pub code: Option<u32>,
    /// Physical width in marker units (0 until sized).
    pub width: f32,
    /// Physical height in marker units (0 until sized).
    pub height: f32,
}

impl Frame {
    pub fn new(wedges: [Wedge; WEDGES_PER_FRAME], detected_by: DetectedBy) -> Self {
        Self {
            wedges,
            detected_by,
            code: None,
            width: 0.0,
            height: 0.0,
        }
    }

    #[inline]
    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }

    /// Dot by flat index `0..20` (wedge-major).
    #[inline]
    pub fn dot(&self, index: usize) -> &Dot {
        &self.wedges[index / DOTS_PER_WEDGE].dots[index % DOTS_PER_WEDGE]
    }

    #[inline]
    pub fn dot_mut(&mut self, index: usize) -> &mut Dot {
        &mut self.wedges[index / DOTS_PER_WEDGE].dots[index % DOTS_PER_WEDGE]
    }

    pub fn dots(&self) -> impl Iterator<Item = &Dot> + '_ {
        self.wedges.iter().flat_map(|w| w.dots.iter())
    }

    /// Corner dot positions in wedge order.
    pub fn corners(&self) -> [Point2<f32>; WEDGES_PER_FRAME] {
        self.wedges.map(|w| w.corner().position)
    }

    pub fn center(&self) -> Point2<f32> {
        let sum = self
            .corners()
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / WEDGES_PER_FRAME as f32)
    }

    /// Bounding-box extent of the corners, `(max x - min x) + (max y - min y)`.
    pub fn extent(&self) -> f32 {
        let corners = self.corners();
        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for c in corners {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }
        (max_x - min_x) + (max_y - min_y)
    }

    /// Homography mapping marker-plane coordinates onto the image corners.
    ///
    /// The marker plane spans `(0,0)..(width,height)` with `wedges[0]` at the
    /// origin and `wedges[1]` along +x. Returns `None` before the frame has
    /// been sized.
    pub fn homography_from_marker(&self) -> Option<Homography> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let plane = [
            Point2::new(0.0, 0.0),
            Point2::new(self.width, 0.0),
            Point2::new(self.width, self.height),
            Point2::new(0.0, self.height),
        ];
        homography_from_4pt(&plane, &self.corners())
    }
}
