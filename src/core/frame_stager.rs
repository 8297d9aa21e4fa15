// Frame stager - holds the latest landmark frame delivered by the estimator

use crate::core::joint_filter;
use crate::models::landmark::{JointSetMode, LandmarkFrame, LandmarkResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing what the stager has done with delivered frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingStatistics {
    pub frames_staged: u64,
    pub frames_cleared: u64,
    pub frames_rejected: u64,
}

/// Single-slot cell shared between the estimator callback and the render loop.
///
/// Frames are brought into the stager's joint-set mode before the slot is
/// touched, and the slot only ever holds a complete `Arc` snapshot, so readers
/// never see a frame halfway through filtering. The mode is fixed at
/// construction.
pub struct FrameStager {
    mode: JointSetMode,
    staged: RwLock<Option<Arc<LandmarkFrame>>>,
    frames_staged: AtomicU64,
    frames_cleared: AtomicU64,
    frames_rejected: AtomicU64,
}

impl FrameStager {
    pub fn new(mode: JointSetMode) -> Self {
        Self {
            mode,
            staged: RwLock::new(None),
            frames_staged: AtomicU64::new(0),
            frames_cleared: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
        }
    }

    /// Create a stager from the `filter_landmarks` flag.
    pub fn with_filter(filter_landmarks: bool) -> Self {
        Self::new(JointSetMode::from_filter_flag(filter_landmarks))
    }

    pub fn mode(&self) -> JointSetMode {
        self.mode
    }

    /// Stage the result of one detection cycle.
    ///
    /// `None` clears the slot. A malformed frame is rejected and the
    /// previously staged frame is kept.
    pub fn submit_frame(&self, detection: Option<LandmarkFrame>) -> LandmarkResult<()> {
        let frame = match detection {
            Some(frame) => frame,
            None => {
                *self.staged.write() = None;
                self.frames_cleared.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("No detection, staged frame cleared");
                return Ok(());
            }
        };

        let timestamp_ms = frame.timestamp_ms();
        let staged = match joint_filter::apply_mode(frame, self.mode) {
            Ok(staged) => staged,
            Err(e) => {
                self.frames_rejected.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(timestamp_ms, mode = self.mode.as_str(), "Rejected frame: {}", e);
                return Err(e);
            }
        };

        *self.staged.write() = Some(Arc::new(staged));
        self.frames_staged.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(timestamp_ms, "Frame staged");

        Ok(())
    }

    /// Latest staged frame, or `None` when nothing is detected.
    pub fn current_frame(&self) -> Option<Arc<LandmarkFrame>> {
        self.staged.read().clone()
    }

    pub fn statistics(&self) -> StagingStatistics {
        StagingStatistics {
            frames_staged: self.frames_staged.load(Ordering::Relaxed),
            frames_cleared: self.frames_cleared.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
        }
    }
}
