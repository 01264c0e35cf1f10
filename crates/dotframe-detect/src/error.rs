/// Errors returned when configuring a detector.
///
/// The per-frame update itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum DotFrameError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParams {
        name: &'static str,
        reason: &'static str,
    },
}

/// Errors from JSON config/report handling.
#[derive(thiserror::Error, Debug)]
pub enum DotFrameIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
