// Landmark staging, filtering, classification, and overlay projection

pub mod config;
pub mod topology;
pub mod joint_filter;
pub mod frame_stager;
pub mod pose_classifier;
pub mod overlay_projector;
pub mod overlay_renderer;

// Asynchronous estimation driver
pub mod pose_session;
