//! Marker code tables and decoding for colored-dot frames.
//!
//! This crate focuses on:
//! - the code240 table mapping 5-dot color patterns to wedge codes,
//! - classifying the five dot colors of a wedge into the four color classes,
//! - the checksum/rotation decode that turns four wedge codes into a frame id,
//!   and its inverse for generating markers.
//!
//! It does **not** find wedges or frames; see `dotframe-detect` for that.

mod code240;
mod frame_code;
mod wedge_code;

pub use code240::{pattern_as_int, Code240, ColorClass, Pattern, CODE240_SIZE, PATTERN_DIGITS};
pub use frame_code::{
    decode_frame, decode_frame_codes, encode_frame_code, FrameDecode, FRAME_CODE_COUNT,
    SEGMENT_COUNT,
};
pub use wedge_code::{classify_wedge_colors, decode_wedge, DecodeParams};
