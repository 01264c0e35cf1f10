//! The code240 table.
//!
//! A wedge pattern is a 5-digit base-4 string (one color class per dot) that
//! uses every class at least once. There are exactly 240 such strings; their
//! rank in ascending numeric order is the wedge code.

use dotframe_core::DotColor;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

pub const CODE240_SIZE: usize = 240;
pub const PATTERN_DIGITS: usize = 5;

/// One color-class digit per wedge dot, `dots[0]` first.
pub type Pattern = [u8; PATTERN_DIGITS];

const PATTERN_SPACE: usize = 1 << (2 * PATTERN_DIGITS);

/// The four printed dot colors.
///
/// The `a`-axis pair (red/green) and the `b`-axis pair (orange/purple) are
/// told apart by which chromatic channel separates them the most.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ColorClass {
    /// Red.
    BigA = 0,
    /// Orange.
    BigB = 1,
    /// Green.
    SmallA = 2,
    /// Purple.
    SmallB = 3,
}

impl ColorClass {
    pub const ALL: [ColorClass; 4] = [
        ColorClass::BigA,
        ColorClass::BigB,
        ColorClass::SmallA,
        ColorClass::SmallB,
    ];

    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.get(digit as usize).copied()
    }

    #[inline]
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// Nominal Lab color of a printed dot of this class.
    pub fn reference_color(self) -> DotColor {
        match self {
            ColorClass::BigA => DotColor::new(54.0, 60.0, 10.0),
            ColorClass::BigB => DotColor::new(70.0, 10.0, 60.0),
            ColorClass::SmallA => DotColor::new(60.0, -50.0, 10.0),
            ColorClass::SmallB => DotColor::new(40.0, 10.0, -50.0),
        }
    }
}

/// Pack a pattern as `256 a + 64 b + 16 c + 4 d + e`.
#[inline]
pub fn pattern_as_int(pattern: &Pattern) -> usize {
    pattern
        .iter()
        .fold(0usize, |acc, &digit| acc * 4 + (digit & 3) as usize)
}

fn int_as_pattern(value: usize) -> Pattern {
    std::array::from_fn(|k| ((value >> (2 * (PATTERN_DIGITS - 1 - k))) & 3) as u8)
}

fn uses_all_classes(pattern: &Pattern) -> bool {
    ColorClass::ALL
        .iter()
        .all(|class| pattern.contains(&class.digit()))
}

/// Bijection between valid patterns and wedge codes `0..240`.
#[derive(Debug)]
pub struct Code240 {
    pattern_to_index: [Option<u8>; PATTERN_SPACE],
    index_to_pattern: Vec<Pattern>,
}

static TABLE: OnceLock<Code240> = OnceLock::new();

impl Code240 {
    /// Shared table, built on first use.
    pub fn get() -> &'static Code240 {
        TABLE.get_or_init(Code240::build)
    }

    fn build() -> Self {
        let mut pattern_to_index = [None; PATTERN_SPACE];
        let mut index_to_pattern = Vec::with_capacity(CODE240_SIZE);

        for value in 0..PATTERN_SPACE {
            let pattern = int_as_pattern(value);
            if uses_all_classes(&pattern) {
                pattern_to_index[value] = Some(index_to_pattern.len() as u8);
                index_to_pattern.push(pattern);
            }
        }
        debug_assert_eq!(index_to_pattern.len(), CODE240_SIZE);

        Self {
            pattern_to_index,
            index_to_pattern,
        }
    }

    /// Wedge code for a pattern, `None` if some class is missing.
    #[inline]
    pub fn index_of(&self, pattern: &Pattern) -> Option<u8> {
        if pattern.iter().any(|&d| d > 3) {
            return None;
        }
        self.pattern_to_index[pattern_as_int(pattern)]
    }

    #[inline]
    pub fn pattern(&self, index: u8) -> Option<Pattern> {
        self.index_to_pattern.get(index as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.index_to_pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_to_pattern.is_empty()
    }
}
