// Data models for pose classification results

use serde::{Deserialize, Serialize};

// ==============================================================================
// Pose Label
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoseLabel {
    TPose,
    NoPoseDetected,
}

impl PoseLabel {
    /// Caption shown next to the overlay.
    pub fn as_str(&self) -> &'static str {
        match self {
            PoseLabel::TPose => "T Pose",
            PoseLabel::NoPoseDetected => "No Pose Detected",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, PoseLabel::NoPoseDetected)
    }
}

impl std::fmt::Display for PoseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// Classification
// ==============================================================================

/// Point in world space, as computed during classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Neck and hip references retained for rendering.
///
/// Both are component-wise sums of the left/right joints, not midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoints {
    pub neck: WorldPoint,
    pub hip: WorldPoint,
}

/// Outcome of classifying one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: PoseLabel,
    pub reference_points: Option<ReferencePoints>,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            label: PoseLabel::NoPoseDetected,
            reference_points: None,
        }
    }

    pub fn matched(label: PoseLabel, reference_points: ReferencePoints) -> Self {
        Self {
            label,
            reference_points: Some(reference_points),
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.label.is_recognized()
    }
}

impl Default for Classification {
    fn default() -> Self {
        Self::none()
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Frame has {actual} joints, classifier needs {required}")]
    InsufficientJoints { required: usize, actual: usize },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("Pose estimation not initialized")]
    NotInitialized,

    #[error("Pose tracking already running")]
    AlreadyRunning,

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error(transparent)]
    Landmark(#[from] super::landmark::LandmarkError),
}

pub type PoseResult<T> = Result<T, PoseError>;
