//! JSON configuration and report helpers for offline replay.
//!
//! A config names a dot list (and optionally the frames of the previous
//! video frame); running it produces a report with the updated frames.

use crate::params::{
    AssemblyParams, DetectorParams, GraphParams, SizingParams, TrackerParams, WedgeParams,
};
use crate::{DotFrameDetector, DotFrameError, DotFrameIoError};
use dotframe_code::DecodeParams;
use dotframe_core::{DetectedBy, Dot, Frame};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

fn default_capacity() -> usize {
    64
}

fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, DotFrameIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn write_pretty<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), DotFrameIoError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a JSON array of dots.
pub fn load_dots(path: impl AsRef<Path>) -> Result<Vec<Dot>, DotFrameIoError> {
    read_json(path)
}

/// Load a JSON array of frames, e.g. the `frames` of an earlier report.
pub fn load_frames(path: impl AsRef<Path>) -> Result<Vec<Frame>, DotFrameIoError> {
    read_json(path)
}

/// Configuration for one offline update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotFrameConfig {
    pub dots_path: String,
    #[serde(default)]
    pub previous_frames_path: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub graph: Option<GraphParams>,
    #[serde(default)]
    pub wedge: Option<WedgeParams>,
    #[serde(default)]
    pub assembly: Option<AssemblyParams>,
    #[serde(default)]
    pub decode: Option<DecodeParams>,
    #[serde(default)]
    pub sizing: Option<SizingParams>,
    #[serde(default)]
    pub tracker: Option<TrackerParams>,
}

impl DotFrameConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DotFrameIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DotFrameIoError> {
        write_pretty(self, path)
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dotframe_report.json"))
    }

    /// Default parameters with the config's overrides applied.
    pub fn build_params(&self) -> DetectorParams {
        let mut params = DetectorParams::default();
        if let Some(graph) = self.graph.clone() {
            params.graph = graph;
        }
        if let Some(wedge) = self.wedge.clone() {
            params.wedge = wedge;
        }
        if let Some(assembly) = self.assembly.clone() {
            params.assembly = assembly;
        }
        if let Some(decode) = self.decode.clone() {
            params.decode = decode;
        }
        if let Some(sizing) = self.sizing.clone() {
            params.sizing = sizing;
        }
        if let Some(tracker) = self.tracker.clone() {
            params.tracker = tracker;
        }
        if self.seed.is_some() {
            params.tracker.seed = self.seed;
        }
        params
    }

    pub fn build_detector(&self) -> Result<DotFrameDetector, DotFrameError> {
        DotFrameDetector::new(self.build_params())
    }

    /// Load the inputs, run one update and build the report.
    ///
    /// Invalid parameters end up in `report.error`; only I/O and JSON
    /// problems are returned as errors.
    pub fn run(&self, config_path: &Path) -> Result<DotFrameReport, DotFrameIoError> {
        let mut dots = load_dots(&self.dots_path)?;
        let prev = match &self.previous_frames_path {
            Some(path) => load_frames(path)?,
            None => Vec::new(),
        };

        let mut report = DotFrameReport::new(self, config_path, dots.len());
        match self.build_detector() {
            Ok(detector) => {
                let frames = detector.update(&mut dots, &prev, self.capacity);
                report.set_frames(frames, &dots);
            }
            Err(err) => report.set_error(err),
        }
        Ok(report)
    }
}

/// Frame counts by origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedByCounts {
    pub stationary: usize,
    pub moving: usize,
    pub scratch: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotFrameReport {
    pub dots_path: String,
    pub config_path: String,
    pub num_dots: usize,
    #[serde(default)]
    pub num_claimed_dots: usize,
    #[serde(default)]
    pub counts: DetectedByCounts,
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DotFrameReport {
    pub fn new(cfg: &DotFrameConfig, config_path: &Path, num_dots: usize) -> Self {
        Self {
            dots_path: cfg.dots_path.clone(),
            config_path: config_path.to_string_lossy().into_owned(),
            num_dots,
            num_claimed_dots: 0,
            counts: DetectedByCounts::default(),
            frames: Vec::new(),
            error: None,
        }
    }

    /// Record the frames of a finished update and the dots it claimed.
    pub fn set_frames(&mut self, frames: Vec<Frame>, dots: &[Dot]) {
        let mut counts = DetectedByCounts::default();
        for frame in &frames {
            match frame.detected_by {
                DetectedBy::Stationary => counts.stationary += 1,
                DetectedBy::Moving => counts.moving += 1,
                DetectedBy::Scratch => counts.scratch += 1,
            }
        }
        self.counts = counts;
        self.num_claimed_dots = dots.iter().filter(|d| !d.valid).count();
        self.frames = frames;
        self.error = None;
    }

    pub fn set_error(&mut self, err: DotFrameError) {
        self.error = Some(err.to_string());
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DotFrameIoError> {
        read_json(path)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), DotFrameIoError> {
        write_pretty(self, path)
    }
}
