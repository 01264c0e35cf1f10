//! High-level facade crate for the `dotframe-*` workspace.
//!
//! A dotframe marker is a square of four *wedges* (five colored dots forming
//! an L at each corner). The dot colors spell four code240 wedge codes whose
//! checksum fixes the marker's rotation and carries an id in `[0, 120^3)`.
//!
//! ## Quickstart
//!
//! ```
//! use dotframe::{DetectedBy, DetectorParams, DotFrameSession, DotFrameDetector};
//! use dotframe::detect::synthetic::{frame_dots, SyntheticFrame};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = DotFrameDetector::new(DetectorParams::default())?;
//! let mut session = DotFrameSession::new(detector, 16);
//!
//! // Dots would normally come from a blob detector, one list per video frame.
//! let mut dots = frame_dots(42, &SyntheticFrame::default()).ok_or("bad code")?;
//! let frames = session.process(&mut dots);
//! assert_eq!(frames[0].code, Some(42));
//! assert_eq!(frames[0].detected_by, DetectedBy::Scratch);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dotframe::core`: dots, wedges, frames, angle helpers, homographies, logger.
//! - `dotframe::code`: the code240 table, color classification, frame id
//!   decode/encode.
//! - `dotframe::detect`: neighbor graph, wedge and frame assembly, tracking,
//!   the per-frame detector, JSON config/report, synthetic markers.

pub use dotframe_code as code;
pub use dotframe_core as core;
pub use dotframe_detect as detect;

pub use dotframe_code::{decode_frame, encode_frame_code, DecodeParams, FRAME_CODE_COUNT};
pub use dotframe_core::{
    init_with_level, DetectedBy, Dot, DotColor, Frame, Homography, Wedge, DOTS_PER_FRAME,
};
pub use dotframe_detect::{
    DetectorParams, DotFrameConfig, DotFrameDetector, DotFrameError, DotFrameIoError,
    DotFrameReport, DotFrameSession, TrackerParams,
};

/// Route `log` records into `tracing` and install a fmt subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
#[cfg(feature = "tracing")]
pub fn init_tracing_bridge() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
