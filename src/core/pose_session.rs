use crate::core::config::Config;
use crate::core::frame_stager::{FrameStager, StagingStatistics};
use crate::core::overlay_projector;
use crate::core::pose_classifier::PoseClassifier;
use crate::models::landmark::LandmarkFrame;
use crate::models::overlay::Overlay;
use crate::models::pose::{Classification, PoseError, PoseResult};
use crate::platform::pose::PoseEstimator;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Camera image waiting for estimation
struct CapturedImage {
    image: RgbImage,
    timestamp_ms: i64,
}

type CaptureSlot = Option<Arc<CapturedImage>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub session_id: String,
    pub captures_submitted: u64,
    pub detections_run: u64,
    pub inference_failures: u64,
    pub staging: StagingStatistics,
}

#[derive(Default)]
struct Counters {
    captures_submitted: AtomicU64,
    detections_run: AtomicU64,
    inference_failures: AtomicU64,
}

// ==============================================================================
// Pose Session
// ==============================================================================

/// Drives the estimator off the acquisition loop.
///
/// Captures are handed over through a latest-value channel: a capture that
/// arrives while the estimator is busy replaces any capture still waiting,
/// and results are staged in capture order by a single worker.
pub struct PoseSession {
    session_id: Uuid,
    estimator: Arc<dyn PoseEstimator>,
    stager: Arc<FrameStager>,
    classifier: Arc<PoseClassifier>,
    counters: Arc<Counters>,
    is_tracking: Arc<RwLock<bool>>,
    capture_tx: Arc<RwLock<Option<watch::Sender<CaptureSlot>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl PoseSession {
    pub fn new(estimator: Arc<dyn PoseEstimator>, config: &Config) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            estimator,
            stager: Arc::new(FrameStager::with_filter(config.filter_landmarks)),
            classifier: Arc::new(PoseClassifier::new(config.thresholds)),
            counters: Arc::new(Counters::default()),
            is_tracking: Arc::new(RwLock::new(false)),
            capture_tx: Arc::new(RwLock::new(None)),
            worker: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn stager(&self) -> &Arc<FrameStager> {
        &self.stager
    }

    /// Start the estimation worker
    pub async fn start_tracking(&self) -> PoseResult<()> {
        let mut is_tracking = self.is_tracking.write().await;
        if *is_tracking {
            return Err(PoseError::AlreadyRunning);
        }

        if !self.estimator.is_initialized() {
            return Err(PoseError::NotInitialized);
        }

        let (tx, rx) = watch::channel::<CaptureSlot>(None);
        *self.capture_tx.write().await = Some(tx);

        let estimator = self.estimator.clone();
        let stager = self.stager.clone();
        let counters = self.counters.clone();
        let handle = tokio::spawn(async move {
            Self::process_captures(rx, estimator, stager, counters).await;
        });
        *self.worker.lock().await = Some(handle);

        *is_tracking = true;

        tracing::info!(
            session_id = %self.session_id,
            estimator = %self.estimator.get_model_info(),
            mode = self.stager.mode().as_str(),
            "Started pose tracking"
        );
        Ok(())
    }

    /// Stop the worker once the latest pending capture has been processed
    pub async fn stop_tracking(&self) -> PoseResult<()> {
        let mut is_tracking = self.is_tracking.write().await;
        if !*is_tracking {
            return Ok(());
        }

        // Dropping the sender ends the worker loop
        *self.capture_tx.write().await = None;

        let worker = self.worker.lock().await.take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                tracing::error!(session_id = %self.session_id, "Pose worker failed: {}", e);
            }
        }

        *is_tracking = false;

        tracing::info!(session_id = %self.session_id, "Stopped pose tracking");
        Ok(())
    }

    pub async fn is_tracking(&self) -> bool {
        *self.is_tracking.read().await
    }

    /// Hand a captured image to the estimator without waiting for the result
    pub async fn submit_image(&self, image: RgbImage, timestamp_ms: i64) -> PoseResult<()> {
        let capture_tx = self.capture_tx.read().await;
        let tx = match capture_tx.as_ref() {
            Some(tx) => tx,
            None => return Ok(()),
        };

        self.counters.captures_submitted.fetch_add(1, Ordering::Relaxed);
        tx.send_replace(Some(Arc::new(CapturedImage { image, timestamp_ms })));
        Ok(())
    }

    /// Same as `submit_image`, stamped with the current wall-clock time
    pub async fn submit_image_now(&self, image: RgbImage) -> PoseResult<()> {
        self.submit_image(image, chrono::Utc::now().timestamp_millis()).await
    }

    /// Latest staged frame
    pub fn current_frame(&self) -> Option<Arc<LandmarkFrame>> {
        self.stager.current_frame()
    }

    /// Classify and project the latest staged frame in one consistent snapshot
    pub fn snapshot(&self, width: u32, height: u32) -> (Classification, Overlay) {
        let frame = self.stager.current_frame();
        let classification = self.classifier.classify(frame.as_deref());
        let overlay = overlay_projector::project(frame.as_deref(), &classification, width, height);
        (classification, overlay)
    }

    pub fn get_statistics(&self) -> SessionStatistics {
        SessionStatistics {
            session_id: self.session_id.to_string(),
            captures_submitted: self.counters.captures_submitted.load(Ordering::Relaxed),
            detections_run: self.counters.detections_run.load(Ordering::Relaxed),
            inference_failures: self.counters.inference_failures.load(Ordering::Relaxed),
            staging: self.stager.statistics(),
        }
    }

    /// Background task: run the estimator on each newest capture and stage
    /// the result
    async fn process_captures(
        mut rx: watch::Receiver<CaptureSlot>,
        estimator: Arc<dyn PoseEstimator>,
        stager: Arc<FrameStager>,
        counters: Arc<Counters>,
    ) {
        while rx.changed().await.is_ok() {
            let slot = rx.borrow_and_update().clone();
            let capture = match slot {
                Some(capture) => capture,
                None => continue,
            };

            let estimator = estimator.clone();
            let timestamp_ms = capture.timestamp_ms;
            let detection = tokio::task::spawn_blocking(move || {
                estimator.detect(&capture.image, capture.timestamp_ms)
            })
            .await;
            counters.detections_run.fetch_add(1, Ordering::Relaxed);

            match detection {
                Ok(Ok(frame)) => {
                    // Rejections are logged and counted by the stager
                    let _ = stager.submit_frame(frame);
                }
                Ok(Err(e)) => {
                    counters.inference_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(timestamp_ms, "Pose estimation failed: {}", e);
                }
                Err(e) => {
                    counters.inference_failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(timestamp_ms, "Pose estimation task panicked: {}", e);
                }
            }
        }
    }
}
