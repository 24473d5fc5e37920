//! Detection records and their JSON sidecar.
//!
//! Detections are produced by an external detector in natural-image pixel
//! coordinates; this crate only edits and re-saves them. The sidecar lives
//! next to the image: `photo.jpg` gets `photo.jpg.detections.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geometry::{BoundingBox, Mapping};

/// A labeled box with a confidence score, in natural coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DetectionFile {
    detections: Vec<Detection>,
}

pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(format!(
        "{}.detections.json",
        image_path
            .extension()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    ))
}

/// Load a detections file. A missing file is an empty list, not an error;
/// a malformed one is.
pub fn load_detections(path: &Path) -> Result<Vec<Detection>, AppError> {
    if !path.exists() {
        log::info!("no detections file at {}", path.display());
        return Ok(Vec::new());
    }
    let data = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DetectionFile = serde_json::from_str(&data).map_err(|source| AppError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.detections)
}

pub fn save_detections(path: &Path, detections: &[Detection]) -> Result<(), AppError> {
    let file = DetectionFile {
        detections: detections.to_vec(),
    };
    let data = serde_json::to_string_pretty(&file).map_err(|source| AppError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, data).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("saved {} detections to {}", detections.len(), path.display());
    Ok(())
}

/// Scale every detection's box into display space. Order, labels and
/// scores are untouched; only the boxes change.
pub fn scale_to_display(detections: &[Detection], mapping: &Mapping) -> Vec<Detection> {
    detections
        .iter()
        .map(|det| Detection {
            bbox: mapping.to_display(det.bbox),
            ..det.clone()
        })
        .collect()
}
