// Data models for body landmarks delivered by the pose-estimation engine

use serde::{Deserialize, Serialize};

// ==============================================================================
// Joint
// ==============================================================================

/// A single tracked body joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub x: f32, // Normalized [0, 1] in image space, metres in world space
    pub y: f32,
    pub z: f32, // Depth (relative to the hip center for world landmarks)
    #[serde(default = "default_visibility")]
    pub visibility: f32, // Estimator visibility score [0, 1]
}

fn default_visibility() -> f32 {
    1.0
}

impl Joint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: default_visibility(),
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

// ==============================================================================
// Joint-Set Mode
// ==============================================================================

/// Which anatomical joint set a frame (or a component) works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointSetMode {
    /// All 33 joints, including face and feet
    Full,
    /// Face and feet removed, 18 joints renumbered from 0
    Reduced,
}

impl JointSetMode {
    /// Select the mode from the single construction-time flag.
    pub fn from_filter_flag(filter_landmarks: bool) -> Self {
        if filter_landmarks {
            JointSetMode::Reduced
        } else {
            JointSetMode::Full
        }
    }

    pub fn joint_count(&self) -> usize {
        match self {
            JointSetMode::Full => FULL_JOINT_COUNT,
            JointSetMode::Reduced => REDUCED_JOINT_COUNT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JointSetMode::Full => "full",
            JointSetMode::Reduced => "reduced",
        }
    }
}

pub const FULL_JOINT_COUNT: usize = 33;
pub const FACE_JOINT_COUNT: usize = 11;
pub const FEET_JOINT_COUNT: usize = 4;
pub const REDUCED_JOINT_COUNT: usize = FULL_JOINT_COUNT - FACE_JOINT_COUNT - FEET_JOINT_COUNT;

/// Standard full-body landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    /// Position of this landmark in a frame of the given mode, if it survives
    /// filtering.
    pub fn index(self, mode: JointSetMode) -> Option<usize> {
        let full = self as usize;
        match mode {
            JointSetMode::Full => Some(full),
            JointSetMode::Reduced => {
                if (FACE_JOINT_COUNT..FULL_JOINT_COUNT - FEET_JOINT_COUNT).contains(&full) {
                    Some(full - FACE_JOINT_COUNT)
                } else {
                    None
                }
            }
        }
    }
}

// ==============================================================================
// Landmark Frame
// ==============================================================================

/// Joints detected for one video frame, in both coordinate spaces.
///
/// Image-space joint `i` and world-space joint `i` describe the same body part.
/// The frame records which joint set it holds so that a reduced frame cannot
/// be reduced again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FrameParts")]
pub struct LandmarkFrame {
    timestamp_ms: i64,
    mode: JointSetMode,
    image_landmarks: Vec<Joint>,
    world_landmarks: Vec<Joint>,
}

impl LandmarkFrame {
    /// Build a full-topology frame as delivered by the estimator.
    pub fn new(
        timestamp_ms: i64,
        image_landmarks: Vec<Joint>,
        world_landmarks: Vec<Joint>,
    ) -> LandmarkResult<Self> {
        Self::with_mode(timestamp_ms, JointSetMode::Full, image_landmarks, world_landmarks)
    }

    /// Build a frame that already holds the given joint set.
    pub fn with_mode(
        timestamp_ms: i64,
        mode: JointSetMode,
        image_landmarks: Vec<Joint>,
        world_landmarks: Vec<Joint>,
    ) -> LandmarkResult<Self> {
        if image_landmarks.len() != world_landmarks.len() {
            return Err(LandmarkError::SpaceLengthMismatch {
                image: image_landmarks.len(),
                world: world_landmarks.len(),
            });
        }

        Ok(Self {
            timestamp_ms,
            mode,
            image_landmarks,
            world_landmarks,
        })
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn mode(&self) -> JointSetMode {
        self.mode
    }

    pub fn image_landmarks(&self) -> &[Joint] {
        &self.image_landmarks
    }

    pub fn world_landmarks(&self) -> &[Joint] {
        &self.world_landmarks
    }

    pub fn len(&self) -> usize {
        self.image_landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_landmarks.is_empty()
    }

    /// Check that the frame holds exactly the joint count of its mode.
    pub fn validate(&self) -> LandmarkResult<()> {
        let expected = self.mode.joint_count();
        if self.len() != expected {
            return Err(LandmarkError::JointCountMismatch {
                mode: self.mode,
                expected,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

/// Serialized shape of a frame, checked by `LandmarkFrame::with_mode` on load
#[derive(Deserialize)]
struct FrameParts {
    timestamp_ms: i64,
    mode: JointSetMode,
    image_landmarks: Vec<Joint>,
    world_landmarks: Vec<Joint>,
}

impl TryFrom<FrameParts> for LandmarkFrame {
    type Error = LandmarkError;

    fn try_from(parts: FrameParts) -> LandmarkResult<Self> {
        Self::with_mode(parts.timestamp_ms, parts.mode, parts.image_landmarks, parts.world_landmarks)
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LandmarkError {
    #[error("Expected {expected} joints for {mode_name} mode, got {actual}", mode_name = .mode.as_str())]
    JointCountMismatch {
        mode: JointSetMode,
        expected: usize,
        actual: usize,
    },

    #[error("Image and world landmark counts differ: {image} vs {world}")]
    SpaceLengthMismatch { image: usize, world: usize },

    #[error("Frame has already been reduced")]
    AlreadyReduced,

    #[error("Frame has {actual} joints, at least {required} required")]
    TooFewJoints { required: usize, actual: usize },
}

pub type LandmarkResult<T> = Result<T, LandmarkError>;
