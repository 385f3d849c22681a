use std::path::PathBuf;
use thiserror::Error;

/// Why a candidate file was not accepted for playback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("nothing was dropped")]
    EmptyDrop,

    #[error("unsupported video format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to write preferences to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to probe {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("{} has no video stream", .0.display())]
    NoVideoStream(PathBuf),

    #[error("failed to start ffmpeg: {0}")]
    Spawn(#[from] std::io::Error),
}
