//! Frame ids from four wedge codes.
//!
//! Wedge 0 carries an odd checksum digit, wedges 1..3 carry even digits that
//! encode three scrambled base-120 segments:
//!
//! ```text
//! w0 = (w1 + w2 + w3 + 1) mod 240
//! y_k = w_k / 2
//! x1 = y1,  x2 = (y2 - 7 y1) mod 120,  x3 = (y3 - 11 y1) mod 120
//! id = x1 + 120 x2 + 120^2 x3
//! ```
//!
//! The checksum also fixes the rotation: exactly one wedge is odd.

use crate::code240::CODE240_SIZE;
use crate::wedge_code::{decode_wedge, DecodeParams};
use dotframe_core::{Frame, WEDGES_PER_FRAME};
use serde::{Deserialize, Serialize};

/// Number of values per id segment.
pub const SEGMENT_COUNT: u32 = 120;
/// Number of distinct frame ids.
pub const FRAME_CODE_COUNT: u32 = SEGMENT_COUNT * SEGMENT_COUNT * SEGMENT_COUNT;

const MODULUS: u32 = CODE240_SIZE as u32;

/// Successful frame decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDecode {
    /// Wedge `rotation` of the input is wedge 0 in decode order; rotate the
    /// wedge array left by this amount to match.
    pub rotation: usize,
    /// Frame id in `[0, FRAME_CODE_COUNT)`.
    pub code: u32,
}

fn checksum_holds(w: [u32; WEDGES_PER_FRAME]) -> bool {
    w[0] % 2 == 1
        && w[1..].iter().all(|c| c % 2 == 0)
        && w[0] == (w[1] + w[2] + w[3] + 1) % MODULUS
}

fn unscramble(y1: u32, y2: u32, y3: u32) -> u32 {
    let n = SEGMENT_COUNT as i64;
    let x1 = y1 as i64;
    let x2 = (y2 as i64 - 7 * y1 as i64).rem_euclid(n);
    let x3 = (y3 as i64 - 11 * y1 as i64).rem_euclid(n);
    (x1 + n * x2 + n * n * x3) as u32
}

/// Find the rotation whose checksum holds and decode the id.
pub fn decode_frame_codes(codes: [u8; WEDGES_PER_FRAME]) -> Option<FrameDecode> {
    (0..WEDGES_PER_FRAME).find_map(|rotation| {
        let w: [u32; WEDGES_PER_FRAME] =
            std::array::from_fn(|k| codes[(k + rotation) % WEDGES_PER_FRAME] as u32);
        checksum_holds(w).then(|| FrameDecode {
            rotation,
            code: unscramble(w[1] / 2, w[2] / 2, w[3] / 2),
        })
    })
}

/// Decode the wedge colors of `frame` and resolve its id and rotation.
///
/// The frame itself is not modified.
pub fn decode_frame(frame: &Frame, params: &DecodeParams) -> Option<FrameDecode> {
    let mut codes = [0u8; WEDGES_PER_FRAME];
    for (code, wedge) in codes.iter_mut().zip(frame.wedges.iter()) {
        *code = decode_wedge(&wedge.colors(), params)?;
    }
    decode_frame_codes(codes)
}

/// Wedge codes `[w0, w1, w2, w3]` (in decode order) that carry `code`.
///
/// Returns `None` for ids outside `[0, FRAME_CODE_COUNT)`.
pub fn encode_frame_code(code: u32) -> Option<[u8; WEDGES_PER_FRAME]> {
    if code >= FRAME_CODE_COUNT {
        return None;
    }
    let n = SEGMENT_COUNT;
    let x1 = code % n;
    let x2 = (code / n) % n;
    let x3 = code / (n * n);

    let y1 = x1;
    let y2 = (x2 + 7 * y1) % n;
    let y3 = (x3 + 11 * y1) % n;

    let (w1, w2, w3) = (2 * y1, 2 * y2, 2 * y3);
    let w0 = (w1 + w2 + w3 + 1) % MODULUS;
    Some([w0 as u8, w1 as u8, w2 as u8, w3 as u8])
}
