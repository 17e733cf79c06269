//! Sync errors.
//!
//! No error is fatal. Refresh failures are logged and retried after the fixed
//! delay; write failures retract the optimistic edit; argument errors fail
//! fast without touching state.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The color is not in the grid's available set.
    #[error("color index {color_index} is not available")]
    InvalidColorIndex { color_index: usize },

    /// The cell lies outside the current grid.
    #[error("cell ({x_index}, {y_index}) is outside the {size}x{size} grid")]
    CellOutOfRange { x_index: usize, y_index: usize, size: usize },

    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A long-poll outlived the client-side timeout and was aborted.
    #[error("long-poll timed out after {0:?}")]
    Timeout(Duration),

    /// A response body could not be deserialized.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A snapshot decoded but is internally inconsistent.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The engine task has shut down.
    #[error("sync engine stopped")]
    EngineStopped,
}

impl SyncError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidColorIndex { .. } => "E_INVALID_COLOR_INDEX",
            Self::CellOutOfRange { .. } => "E_CELL_OUT_OF_RANGE",
            Self::Network(_) => "E_NETWORK",
            Self::Status { .. } => "E_STATUS",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::Decode(_) => "E_DECODE",
            Self::MalformedSnapshot(_) => "E_MALFORMED_SNAPSHOT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::EngineStopped => "E_ENGINE_STOPPED",
        }
    }

    /// Whether repeating the same request could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}
