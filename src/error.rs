//! Application-level errors.
//!
//! The interaction core itself has no failure modes; everything here comes
//! from the edges: decoding the image, reading or writing the detections
//! file, or a bad invocation. All of these are fatal for the host and
//! propagate out of `main`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to decode image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed detections in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{0}")]
    Usage(String),

    #[error("window error: {0}")]
    Gui(#[from] eframe::Error),
}
