pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::config::{ClassifierThresholds, Config, ConfigError, OverlayStyle};
pub use crate::core::frame_stager::{FrameStager, StagingStatistics};
pub use crate::core::joint_filter::filter;
pub use crate::core::overlay_projector::project;
pub use crate::core::overlay_renderer::render_overlay;
pub use crate::core::pose_classifier::{PoseClassifier, PoseTest, TPoseTest};
pub use crate::core::pose_session::{PoseSession, SessionStatistics};
pub use crate::models::landmark::{Joint, JointSetMode, LandmarkError, LandmarkFrame};
pub use crate::models::overlay::{Marker, MarkerStyle, Overlay, PixelPoint, Segment, SegmentStyle};
pub use crate::models::pose::{Classification, PoseError, PoseLabel, ReferencePoints};
pub use crate::platform::pose::{PoseEstimator, RecordedDetection, ReplayEstimator};
