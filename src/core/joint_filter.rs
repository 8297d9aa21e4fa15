// Joint-set filter - drops face and feet joints from a full-body frame

use crate::models::landmark::{
    Joint, JointSetMode, LandmarkError, LandmarkFrame, LandmarkResult, FACE_JOINT_COUNT,
    FEET_JOINT_COUNT, FULL_JOINT_COUNT,
};

/// Reduce a full 33-joint frame to the 18-joint body layout.
///
/// The source frame is left untouched. Both coordinate spaces are sliced with
/// the same index range, so joint `i` of the result is joint `i + 11` of the
/// input. Frames that are already reduced, or that do not carry exactly the
/// full joint count, are rejected.
pub fn filter(frame: &LandmarkFrame) -> LandmarkResult<LandmarkFrame> {
    if frame.mode() == JointSetMode::Reduced {
        return Err(LandmarkError::AlreadyReduced);
    }

    let removed = FACE_JOINT_COUNT + FEET_JOINT_COUNT;
    if frame.len() < removed {
        return Err(LandmarkError::TooFewJoints {
            required: removed,
            actual: frame.len(),
        });
    }
    frame.validate()?;

    let image = reduce(frame.image_landmarks());
    let world = reduce(frame.world_landmarks());

    LandmarkFrame::with_mode(frame.timestamp_ms(), JointSetMode::Reduced, image, world)
}

fn reduce(joints: &[Joint]) -> Vec<Joint> {
    joints[FACE_JOINT_COUNT..FULL_JOINT_COUNT - FEET_JOINT_COUNT].to_vec()
}

/// Bring a delivered frame into the given mode.
pub fn apply_mode(frame: LandmarkFrame, mode: JointSetMode) -> LandmarkResult<LandmarkFrame> {
    match mode {
        JointSetMode::Full => {
            if frame.mode() != JointSetMode::Full {
                return Err(LandmarkError::JointCountMismatch {
                    mode,
                    expected: mode.joint_count(),
                    actual: frame.len(),
                });
            }
            frame.validate()?;
            Ok(frame)
        }
        JointSetMode::Reduced => filter(&frame),
    }
}
