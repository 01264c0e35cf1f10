//! Wedge color classification.
//!
//! A wedge has five dots but only four color classes, so exactly one class
//! appears twice. The two dots with the closest chroma are taken to be that
//! duplicate; the remaining four distinct colors are then split into an
//! `a`-axis pair and a `b`-axis pair by maximizing channel separation.

use crate::code240::{Code240, ColorClass, Pattern, PATTERN_DIGITS};
use dotframe_core::DotColor;
use serde::{Deserialize, Serialize};

/// Decoder settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeParams {
    /// A split must separate the color pairs by more than this
    /// (`|Δa| + |Δb|`) for the wedge to decode.
    pub min_cross_score: f32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            min_cross_score: 0.0,
        }
    }
}

// Each entry is `[a0, b0, a1, b1]`: slots `a0`/`a1` form the a-axis pair and
// `b0`/`b1` the b-axis pair.
const CROSS_SPLITS: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [0, 1, 3, 2],
    [0, 2, 1, 3],
    [1, 0, 2, 3],
    [1, 0, 3, 2],
    [2, 0, 3, 1],
];

fn closest_chroma_pair(colors: &[DotColor; PATTERN_DIGITS]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut best_dist = f32::INFINITY;
    for i in 0..PATTERN_DIGITS {
        for j in (i + 1)..PATTERN_DIGITS {
            let dist = colors[i].chroma_dist_sq(&colors[j]);
            if dist < best_dist {
                best = (i, j);
                best_dist = dist;
            }
        }
    }
    best
}

/// Assign a color class to each of the five wedge dots.
///
/// Returns `None` when no split separates the colors by more than
/// `params.min_cross_score`.
pub fn classify_wedge_colors(
    colors: &[DotColor; PATTERN_DIGITS],
    params: &DecodeParams,
) -> Option<Pattern> {
    let (first, second) = closest_chroma_pair(colors);

    // Merge the duplicate pair into `first` and park `second` in the last slot.
    let mut slots = *colors;
    slots[first].a = 0.5 * (colors[first].a + colors[second].a);
    slots[first].b = 0.5 * (colors[first].b + colors[second].b);
    slots.swap(second, PATTERN_DIGITS - 1);

    let mut best_score = params.min_cross_score;
    let mut best_classes: Option<[u8; 4]> = None;
    for [a0, b0, a1, b1] in CROSS_SPLITS {
        let a_score = (slots[a0].a - slots[a1].a).abs();
        let b_score = (slots[b0].b - slots[b1].b).abs();
        let score = a_score + b_score;
        if score <= best_score {
            continue;
        }

        let mut classes = [0u8; 4];
        let (big_a, small_a) = if slots[a0].a > slots[a1].a {
            (a0, a1)
        } else {
            (a1, a0)
        };
        let (big_b, small_b) = if slots[b0].b > slots[b1].b {
            (b0, b1)
        } else {
            (b1, b0)
        };
        classes[big_a] = ColorClass::BigA.digit();
        classes[small_a] = ColorClass::SmallA.digit();
        classes[big_b] = ColorClass::BigB.digit();
        classes[small_b] = ColorClass::SmallB.digit();

        best_classes = Some(classes);
        best_score = score;
    }
    let classes = best_classes?;

    // Undo the swap: `second` shares the class of `first`, and the dot that
    // was parked in `second`'s slot is the original last dot.
    Some(std::array::from_fn(|k| {
        let slot = if k == second {
            first
        } else if k == PATTERN_DIGITS - 1 {
            second
        } else {
            k
        };
        classes[slot]
    }))
}

/// Decode a wedge's five dot colors into its code240 index.
pub fn decode_wedge(colors: &[DotColor; PATTERN_DIGITS], params: &DecodeParams) -> Option<u8> {
    let pattern = classify_wedge_colors(colors, params)?;
    Code240::get().index_of(&pattern)
}
