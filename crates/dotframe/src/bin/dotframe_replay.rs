//! Replay one dot list through the detector.
//!
//! Usage: `dotframe-replay <config.json>`; the report goes to the config's
//! `output_path` (default `dotframe_report.json`).
//!
//! Logging is filtered by `RUST_LOG` (default `info`), e.g.
//! `RUST_LOG=info,dotframe_detect::track=debug`.

use std::{env, path::PathBuf};

use dotframe::DotFrameConfig;
use log::{info, warn};

#[cfg(feature = "tracing")]
fn init_logging() {
    dotframe::init_tracing_bridge();
}

#[cfg(not(feature = "tracing"))]
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: dotframe-replay <config.json>")?;
    let config = DotFrameConfig::load_json(&config_path)?;
    let report = config.run(&config_path)?;

    if let Some(err) = &report.error {
        warn!("detector not run: {err}");
    }
    info!(
        "{} dots -> {} frames ({} stationary, {} moving, {} scratch), {} dots claimed",
        report.num_dots,
        report.frames.len(),
        report.counts.stationary,
        report.counts.moving,
        report.counts.scratch,
        report.num_claimed_dots
    );
    for frame in &report.frames {
        let center = frame.center();
        info!(
            "  code {:>7} {:?} at ({:.1}, {:.1}), {:.2} x {:.2}",
            frame.code.unwrap_or_default(),
            frame.detected_by,
            center.x,
            center.y,
            frame.width,
            frame.height
        );
    }

    let out = config.output_path();
    report.write_json(&out)?;
    info!("report written to {}", out.display());
    Ok(())
}
