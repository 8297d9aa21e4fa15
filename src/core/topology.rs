// Skeleton connection tables and joint layouts for each joint-set mode

use crate::models::landmark::{BodyLandmark, JointSetMode};

/// Pairs of joint indices drawn as skeleton bones (full 33-joint layout)
pub const FULL_CONNECTIONS: [(usize, usize); 14] = [
    (11, 12), (11, 13), (13, 15), (12, 14), (14, 16), // arms
    (11, 23), (12, 24), (23, 24), // torso
    (23, 25), (24, 26), (25, 27), (26, 28), (27, 31), (28, 32), // legs
];

/// Same skeleton after the face and feet joints are removed
pub const REDUCED_CONNECTIONS: [(usize, usize); 12] = [
    (0, 1), (0, 2), (2, 4), (1, 3), (3, 5), // arms
    (0, 12), (1, 13), (12, 13), // torso
    (12, 14), (13, 15), (14, 16), (15, 17), // legs
];

/// Arm bones, highlighted when a pose is recognized
pub const FULL_ARM_CONNECTIONS: [(usize, usize); 5] = [(11, 12), (11, 13), (13, 15), (12, 14), (14, 16)];
pub const REDUCED_ARM_CONNECTIONS: [(usize, usize); 5] = [(0, 1), (0, 2), (2, 4), (1, 3), (3, 5)];

pub fn connections(mode: JointSetMode) -> &'static [(usize, usize)] {
    match mode {
        JointSetMode::Full => &FULL_CONNECTIONS,
        JointSetMode::Reduced => &REDUCED_CONNECTIONS,
    }
}

pub fn arm_connections(mode: JointSetMode) -> &'static [(usize, usize)] {
    match mode {
        JointSetMode::Full => &FULL_ARM_CONNECTIONS,
        JointSetMode::Reduced => &REDUCED_ARM_CONNECTIONS,
    }
}

/// Whether a bone is part of the highlight set, in either direction.
pub fn is_arm_connection(mode: JointSetMode, connection: (usize, usize)) -> bool {
    let (a, b) = connection;
    arm_connections(mode)
        .iter()
        .any(|&(s, e)| (s, e) == (a, b) || (s, e) == (b, a))
}

/// Indices of the joints the classifier and projector look up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointLayout {
    pub left_shoulder: usize,
    pub right_shoulder: usize,
    pub left_elbow: usize,
    pub right_elbow: usize,
    pub left_wrist: usize,
    pub right_wrist: usize,
    pub left_hip: usize,
    pub right_hip: usize,
}

impl JointLayout {
    pub fn for_mode(mode: JointSetMode) -> Self {
        // Every named joint here lies between the face and feet runs, so it
        // exists in both modes.
        let index = |landmark: BodyLandmark| {
            landmark.index(mode).unwrap_or(landmark as usize)
        };

        Self {
            left_shoulder: index(BodyLandmark::LeftShoulder),
            right_shoulder: index(BodyLandmark::RightShoulder),
            left_elbow: index(BodyLandmark::LeftElbow),
            right_elbow: index(BodyLandmark::RightElbow),
            left_wrist: index(BodyLandmark::LeftWrist),
            right_wrist: index(BodyLandmark::RightWrist),
            left_hip: index(BodyLandmark::LeftHip),
            right_hip: index(BodyLandmark::RightHip),
        }
    }

    /// Shoulders, elbows and wrists, in landmark order.
    pub fn arm_chain(&self) -> [usize; 6] {
        [
            self.left_shoulder,
            self.right_shoulder,
            self.left_elbow,
            self.right_elbow,
            self.left_wrist,
            self.right_wrist,
        ]
    }

    /// Smallest frame length that contains every named joint.
    pub fn min_joint_count(&self) -> usize {
        self.arm_chain()
            .into_iter()
            .chain([self.left_hip, self.right_hip])
            .max()
            .map_or(0, |max| max + 1)
    }
}
