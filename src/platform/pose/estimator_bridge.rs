// Pose-estimation engine integration bridge
// Abstracts the engine that turns camera images into body landmarks

use crate::models::landmark::{Joint, LandmarkFrame};
use crate::models::pose::{PoseError, PoseResult};
use image::RgbImage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Pose estimator bridge trait
/// Implement this for each estimation backend
pub trait PoseEstimator: Send + Sync {
    /// Run one detection cycle on a captured image.
    /// Returns `None` when no subject is detected.
    fn detect(&self, image: &RgbImage, timestamp_ms: i64) -> PoseResult<Option<LandmarkFrame>>;

    /// Check if the estimator is ready
    fn is_initialized(&self) -> bool;

    /// Get model info
    fn get_model_info(&self) -> String;
}

// ==============================================================================
// Recorded Detections
// ==============================================================================

/// One detection cycle as stored in a recording
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedDetection {
    pub timestamp_ms: i64,
    pub image_landmarks: Option<Vec<Joint>>,
    pub world_landmarks: Option<Vec<Joint>>,
}

impl RecordedDetection {
    pub fn none(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            image_landmarks: None,
            world_landmarks: None,
        }
    }

    pub fn from_frame(frame: &LandmarkFrame) -> Self {
        Self {
            timestamp_ms: frame.timestamp_ms(),
            image_landmarks: Some(frame.image_landmarks().to_vec()),
            world_landmarks: Some(frame.world_landmarks().to_vec()),
        }
    }

    /// Convert to a full-topology frame. Empty or missing joint lists mean
    /// "no detection".
    pub fn into_frame(self) -> PoseResult<Option<LandmarkFrame>> {
        match (self.image_landmarks, self.world_landmarks) {
            (Some(image), Some(world)) if !image.is_empty() || !world.is_empty() => {
                Ok(Some(LandmarkFrame::new(self.timestamp_ms, image, world)?))
            }
            (None, Some(world)) if !world.is_empty() => Err(PoseError::Recording(format!(
                "Detection at {} ms has world landmarks but no image landmarks",
                self.timestamp_ms
            ))),
            (Some(image), None) if !image.is_empty() => Err(PoseError::Recording(format!(
                "Detection at {} ms has image landmarks but no world landmarks",
                self.timestamp_ms
            ))),
            _ => Ok(None),
        }
    }
}

/// Load a JSON recording (an array of detections)
pub fn load_recording(path: &Path) -> PoseResult<Vec<RecordedDetection>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| PoseError::Recording(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| PoseError::Recording(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Save detections as a pretty-printed JSON recording
pub fn save_recording(path: &Path, detections: &[RecordedDetection]) -> PoseResult<()> {
    let contents = serde_json::to_string_pretty(detections)
        .map_err(|e| PoseError::Recording(e.to_string()))?;

    std::fs::write(path, contents)
        .map_err(|e| PoseError::Recording(format!("Failed to write {}: {}", path.display(), e)))
}

// ==============================================================================
// Replay Implementation
// ==============================================================================

/// Serves previously recorded detections in order, ignoring the image.
/// Replayed frames carry the capture timestamp passed to `detect`.
pub struct ReplayEstimator {
    detections: Mutex<VecDeque<RecordedDetection>>,
    total: usize,
}

impl ReplayEstimator {
    pub fn new(detections: Vec<RecordedDetection>) -> Self {
        let total = detections.len();
        Self {
            detections: Mutex::new(detections.into()),
            total,
        }
    }

    pub fn from_file(path: &Path) -> PoseResult<Self> {
        Ok(Self::new(load_recording(path)?))
    }

    pub fn remaining(&self) -> usize {
        self.detections.lock().len()
    }
}

impl PoseEstimator for ReplayEstimator {
    fn detect(&self, _image: &RgbImage, timestamp_ms: i64) -> PoseResult<Option<LandmarkFrame>> {
        let next = self.detections.lock().pop_front();
        match next {
            Some(mut detection) => {
                detection.timestamp_ms = timestamp_ms;
                detection.into_frame()
            }
            None => {
                tracing::debug!(timestamp_ms, "Recording exhausted");
                Ok(None)
            }
        }
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_model_info(&self) -> String {
        format!("Replay estimator ({} recorded detections)", self.total)
    }
}

// ==============================================================================
// Dummy Implementation
// ==============================================================================

/// Estimator that never detects anyone
pub struct DummyEstimator;

impl PoseEstimator for DummyEstimator {
    fn detect(&self, _image: &RgbImage, _timestamp_ms: i64) -> PoseResult<Option<LandmarkFrame>> {
        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        false
    }

    fn get_model_info(&self) -> String {
        "Dummy estimator (no inference)".to_string()
    }
}
