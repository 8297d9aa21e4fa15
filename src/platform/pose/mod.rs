// Pose estimation platform integration
// Provides the estimator bridge and replay backends

pub mod estimator_bridge;

pub use estimator_bridge::{
    load_recording, save_recording, DummyEstimator, PoseEstimator, RecordedDetection, ReplayEstimator,
};
