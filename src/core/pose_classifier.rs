// Pose classifier - geometric tests on world-space landmarks

use crate::core::config::ClassifierThresholds;
use crate::core::topology::JointLayout;
use crate::models::landmark::{Joint, LandmarkFrame};
use crate::models::pose::{Classification, PoseError, PoseLabel, PoseResult, ReferencePoints, WorldPoint};

/// Denominators at or below this magnitude are treated as zero
const DEGENERATE_EPSILON: f64 = 1e-9;

// ==============================================================================
// Body Geometry
// ==============================================================================

/// Quantities derived once per frame and shared by every pose test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyGeometry {
    /// Least-squares slope of shoulders, elbows and wrists in the (x, y) plane
    pub arms_slope: f64,
    /// `1 / |torso slope|`, finite even for a perfectly vertical torso
    pub inverse_torso_slope: f64,
    pub reference_points: ReferencePoints,
}

/// Slope of the least-squares line through `points`.
///
/// Fails when the points share one x value (a vertical line) or the
/// result is not finite.
pub fn fit_slope<I>(points: I) -> PoseResult<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut n = 0.0;
    let mut x_sum = 0.0;
    let mut y_sum = 0.0;
    let mut xy_sum = 0.0;
    let mut x2_sum = 0.0;

    for (x, y) in points {
        n += 1.0;
        x_sum += x;
        y_sum += y;
        xy_sum += x * y;
        x2_sum += x * x;
    }

    let denominator = n * x2_sum - x_sum * x_sum;
    if denominator.abs() <= DEGENERATE_EPSILON {
        return Err(PoseError::DegenerateGeometry("arm joints form a vertical line"));
    }

    let slope = (n * xy_sum - x_sum * y_sum) / denominator;
    if !slope.is_finite() {
        return Err(PoseError::DegenerateGeometry("arm slope is not finite"));
    }
    Ok(slope)
}

fn joint_sum(a: &Joint, b: &Joint) -> WorldPoint {
    WorldPoint {
        x: a.x as f64 + b.x as f64,
        y: a.y as f64 + b.y as f64,
        z: a.z as f64 + b.z as f64,
    }
}

impl BodyGeometry {
    pub fn measure(world: &[Joint], layout: &JointLayout) -> PoseResult<Self> {
        let required = layout.min_joint_count();
        if world.len() < required {
            return Err(PoseError::InsufficientJoints {
                required,
                actual: world.len(),
            });
        }

        let neck = joint_sum(&world[layout.left_shoulder], &world[layout.right_shoulder]);
        let hip = joint_sum(&world[layout.left_hip], &world[layout.right_hip]);

        let arms_slope = fit_slope(
            layout
                .arm_chain()
                .iter()
                .map(|&i| (world[i].x as f64, world[i].y as f64)),
        )?;

        // torso slope = dy / dx, so its inverse magnitude is |dx| / |dy|
        let dx = hip.x - neck.x;
        let dy = hip.y - neck.y;
        if dy.abs() <= DEGENERATE_EPSILON {
            return Err(PoseError::DegenerateGeometry("torso slope is zero"));
        }
        let inverse_torso_slope = dx.abs() / dy.abs();

        Ok(Self {
            arms_slope,
            inverse_torso_slope,
            reference_points: ReferencePoints { neck, hip },
        })
    }
}

// ==============================================================================
// Pose Tests
// ==============================================================================

/// One named pose check.
pub trait PoseTest: Send + Sync {
    fn label(&self) -> PoseLabel;

    fn matches(
        &self,
        geometry: &BodyGeometry,
        world: &[Joint],
        layout: &JointLayout,
        thresholds: &ClassifierThresholds,
    ) -> bool;
}

/// Arms straight out to the sides, perpendicular to the torso.
pub struct TPoseTest;

impl PoseTest for TPoseTest {
    fn label(&self) -> PoseLabel {
        PoseLabel::TPose
    }

    fn matches(
        &self,
        geometry: &BodyGeometry,
        world: &[Joint],
        layout: &JointLayout,
        thresholds: &ClassifierThresholds,
    ) -> bool {
        let arms_slope = geometry.arms_slope.abs();
        let horizontal = arms_slope < thresholds.arms_slope;
        // Magnitude only: slopes of perpendicular lines are negative reciprocals
        let perpendicular = (arms_slope - geometry.inverse_torso_slope).abs() < thresholds.perpendicular;

        let level = |a: usize, b: usize| {
            ((world[a].y as f64).abs() - (world[b].y as f64).abs()).abs() < thresholds.symmetry
        };
        let symmetric = level(layout.right_elbow, layout.right_shoulder)
            && level(layout.right_wrist, layout.right_shoulder)
            && level(layout.left_elbow, layout.left_shoulder)
            && level(layout.left_wrist, layout.left_shoulder);

        tracing::debug!(
            arms_slope = geometry.arms_slope,
            inverse_torso_slope = geometry.inverse_torso_slope,
            horizontal,
            perpendicular,
            symmetric,
            "T pose test"
        );

        horizontal && perpendicular && symmetric
    }
}

// ==============================================================================
// Classifier
// ==============================================================================

/// Labels frames with the first pose test that matches.
pub struct PoseClassifier {
    thresholds: ClassifierThresholds,
    tests: Vec<Box<dyn PoseTest>>,
}

impl PoseClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self {
            thresholds,
            tests: vec![Box::new(TPoseTest)],
        }
    }

    /// Append another pose test, checked after the existing ones.
    pub fn with_test(mut self, test: Box<dyn PoseTest>) -> Self {
        self.tests.push(test);
        self
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    /// Classify the staged frame. Absent frames and frames whose geometry
    /// cannot be measured are "No Pose Detected".
    pub fn classify(&self, frame: Option<&LandmarkFrame>) -> Classification {
        let frame = match frame {
            Some(frame) => frame,
            None => return Classification::none(),
        };

        match self.try_classify(frame) {
            Ok(classification) => classification,
            Err(e) => {
                tracing::debug!(timestamp_ms = frame.timestamp_ms(), "Classification skipped: {}", e);
                Classification::none()
            }
        }
    }

    /// Classify a frame, reporting why the geometry could not be measured.
    pub fn try_classify(&self, frame: &LandmarkFrame) -> PoseResult<Classification> {
        let layout = JointLayout::for_mode(frame.mode());
        let world = frame.world_landmarks();
        let geometry = BodyGeometry::measure(world, &layout)?;

        let matched = self
            .tests
            .iter()
            .find(|test| test.matches(&geometry, world, &layout, &self.thresholds));

        Ok(match matched {
            Some(test) => Classification::matched(test.label(), geometry.reference_points),
            None => Classification::none(),
        })
    }
}

impl Default for PoseClassifier {
    fn default() -> Self {
        Self::new(ClassifierThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::joint_filter;
    use crate::models::landmark::{JointSetMode, FACE_JOINT_COUNT, FEET_JOINT_COUNT};

    /// World joints for the 18-joint reduced layout of a subject in a T pose.
    fn t_pose_body() -> Vec<Joint> {
        let mut body = vec![Joint::new(0.0, 0.0, 0.0); 18];
        body[0] = Joint::new(0.2, -0.5, 0.0); // left shoulder
        body[1] = Joint::new(-0.2, -0.5, 0.0); // right shoulder
        body[2] = Joint::new(0.45, -0.5, 0.0); // left elbow
        body[3] = Joint::new(-0.45, -0.5, 0.0); // right elbow
        body[4] = Joint::new(0.7, -0.5, 0.0); // left wrist
        body[5] = Joint::new(-0.7, -0.5, 0.0); // right wrist
        body[12] = Joint::new(0.1, 0.0, 0.0); // left hip
        body[13] = Joint::new(-0.1, 0.0, 0.0); // right hip
        body
    }

    fn reduced_frame(world: Vec<Joint>) -> LandmarkFrame {
        let image = vec![Joint::new(0.5, 0.5, 0.0); world.len()];
        LandmarkFrame::with_mode(0, JointSetMode::Reduced, image, world).unwrap()
    }

    fn full_frame(body: Vec<Joint>) -> LandmarkFrame {
        let mut world = vec![Joint::new(0.0, 0.0, 0.0); FACE_JOINT_COUNT];
        world.extend(body);
        world.extend(vec![Joint::new(0.0, 0.0, 0.0); FEET_JOINT_COUNT]);
        let image = vec![Joint::new(0.5, 0.5, 0.0); world.len()];
        LandmarkFrame::new(0, image, world).unwrap()
    }

    #[test]
    fn test_fit_slope() {
        let slope = fit_slope([(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);

        let flat = fit_slope([(-1.0, 0.5), (0.0, 0.5), (1.0, 0.5)]).unwrap();
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_fit_slope_vertical_line_is_degenerate() {
        let err = fit_slope([(0.3, 0.0), (0.3, 1.0), (0.3, 2.0)]).unwrap_err();
        assert!(matches!(err, PoseError::DegenerateGeometry(_)));
    }

    #[test]
    fn test_t_pose_detected() {
        let classifier = PoseClassifier::default();
        let classification = classifier.classify(Some(&reduced_frame(t_pose_body())));
        assert_eq!(classification.label, PoseLabel::TPose);

        let refs = classification.reference_points.unwrap();
        // Sums, not midpoints
        assert!((refs.neck.y - -1.0).abs() < 1e-9);
        assert!(refs.neck.x.abs() < 1e-9);
        assert!(refs.hip.x.abs() < 1e-9);
        assert!(refs.hip.y.abs() < 1e-9);
    }

    #[test]
    fn test_t_pose_detected_in_full_mode() {
        let classifier = PoseClassifier::default();
        let frame = full_frame(t_pose_body());
        assert_eq!(classifier.classify(Some(&frame)).label, PoseLabel::TPose);

        let reduced = joint_filter::filter(&frame).unwrap();
        assert_eq!(classifier.classify(Some(&reduced)), classifier.classify(Some(&frame)));
    }

    #[test]
    fn test_wrist_shift_breaks_symmetry() {
        let mut body = t_pose_body();
        body[4].y -= 0.2;

        let classification = PoseClassifier::default().classify(Some(&reduced_frame(body)));
        assert_eq!(classification.label, PoseLabel::NoPoseDetected);
        assert!(classification.reference_points.is_none());
    }

    #[test]
    fn test_raised_arms_are_not_horizontal() {
        let mut body = t_pose_body();
        // Left arm rises, right arm drops: a diagonal line through the shoulders
        body[2].y = -0.6;
        body[4].y = -0.7;
        body[3].y = -0.4;
        body[5].y = -0.3;

        let classifier = PoseClassifier::default();
        let frame = reduced_frame(body);
        assert_eq!(classifier.classify(Some(&frame)).label, PoseLabel::NoPoseDetected);
    }

    /// T-pose body with the arm chain on a line of `slope` through the
    /// shoulders' midpoint and the hips shifted so that 1/|torso slope| is `lean`.
    fn tilted_body(slope: f32, lean: f32) -> Vec<Joint> {
        let mut body = t_pose_body();
        for joint in body.iter_mut().take(6) {
            joint.y = -0.5 + slope * joint.x;
        }
        body[12].x = 0.1 + lean;
        body
    }

    fn label(classifier: &PoseClassifier, body: Vec<Joint>) -> PoseLabel {
        classifier.classify(Some(&reduced_frame(body))).label
    }

    #[test]
    fn test_sloped_arms_fail_only_the_horizontal_check() {
        let body = tilted_body(0.1, 0.1);
        let layout = JointLayout::for_mode(JointSetMode::Reduced);
        let geometry = BodyGeometry::measure(&body, &layout).unwrap();
        assert!((geometry.arms_slope - 0.1).abs() < 1e-6);
        assert!((geometry.inverse_torso_slope - 0.1).abs() < 1e-6);

        assert_eq!(label(&PoseClassifier::default(), body.clone()), PoseLabel::NoPoseDetected);

        let relaxed = PoseClassifier::new(ClassifierThresholds {
            arms_slope: 0.2,
            ..ClassifierThresholds::default()
        });
        assert_eq!(label(&relaxed, body), PoseLabel::TPose);
    }

    #[test]
    fn test_arms_slope_threshold_boundary() {
        let classifier = PoseClassifier::default();
        assert_eq!(label(&classifier, tilted_body(0.045, 0.045)), PoseLabel::TPose);
        assert_eq!(label(&classifier, tilted_body(-0.045, 0.045)), PoseLabel::TPose);
        assert_eq!(label(&classifier, tilted_body(0.055, 0.055)), PoseLabel::NoPoseDetected);
    }

    #[test]
    fn test_perpendicular_threshold_boundary() {
        let classifier = PoseClassifier::default();
        assert_eq!(label(&classifier, tilted_body(0.0, 0.045)), PoseLabel::TPose);
        assert_eq!(label(&classifier, tilted_body(0.0, 0.055)), PoseLabel::NoPoseDetected);
        assert_eq!(label(&classifier, tilted_body(0.0, -0.055)), PoseLabel::NoPoseDetected);
    }

    #[test]
    fn test_symmetry_threshold_boundary() {
        let classifier = PoseClassifier::default();
        // Dropping both wrists together leaves the arm slope at zero
        let dropped_wrists = |drop: f32| {
            let mut body = t_pose_body();
            body[4].y -= drop;
            body[5].y -= drop;
            body
        };

        assert_eq!(label(&classifier, dropped_wrists(0.095)), PoseLabel::TPose);
        assert_eq!(label(&classifier, dropped_wrists(0.105)), PoseLabel::NoPoseDetected);

        let geometry = BodyGeometry::measure(
            &dropped_wrists(0.105),
            &JointLayout::for_mode(JointSetMode::Reduced),
        )
        .unwrap();
        assert!(geometry.arms_slope.abs() < 1e-6);
    }

    #[test]
    fn test_leaning_torso_is_not_perpendicular() {
        let mut body = t_pose_body();
        body[12].x += 0.1;
        body[13].x += 0.1;

        let classification = PoseClassifier::default().classify(Some(&reduced_frame(body)));
        assert_eq!(classification.label, PoseLabel::NoPoseDetected);
    }

    #[test]
    fn test_zero_torso_slope_is_a_defined_non_match() {
        let mut body = t_pose_body();
        body[12] = Joint::new(0.5, -0.5, 0.0);
        body[13] = Joint::new(0.6, -0.5, 0.0);
        let frame = reduced_frame(body);

        let classifier = PoseClassifier::default();
        assert!(matches!(
            classifier.try_classify(&frame),
            Err(PoseError::DegenerateGeometry("torso slope is zero"))
        ));
        assert_eq!(classifier.classify(Some(&frame)), Classification::none());
    }

    #[test]
    fn test_vertical_arm_line_is_a_defined_non_match() {
        let mut body = t_pose_body();
        for (i, joint) in body.iter_mut().take(6).enumerate() {
            *joint = Joint::new(0.1, -0.5 + 0.1 * i as f32, 0.0);
        }
        let frame = reduced_frame(body);

        let classifier = PoseClassifier::default();
        assert!(classifier.try_classify(&frame).is_err());
        assert_eq!(classifier.classify(Some(&frame)).label, PoseLabel::NoPoseDetected);
    }

    #[test]
    fn test_absent_frame() {
        assert_eq!(PoseClassifier::default().classify(None), Classification::none());
    }

    #[test]
    fn test_short_frame_is_insufficient() {
        let frame = reduced_frame(t_pose_body()[..10].to_vec());
        let err = PoseClassifier::default().try_classify(&frame).unwrap_err();
        assert!(matches!(err, PoseError::InsufficientJoints { required: 14, actual: 10 }));
    }

    struct AlwaysTest;

    impl PoseTest for AlwaysTest {
        fn label(&self) -> PoseLabel {
            PoseLabel::TPose
        }

        fn matches(&self, _: &BodyGeometry, _: &[Joint], _: &JointLayout, _: &ClassifierThresholds) -> bool {
            true
        }
    }

    #[test]
    fn test_additional_tests_run_after_t_pose() {
        let mut body = t_pose_body();
        body[4].y -= 0.2;

        let classifier = PoseClassifier::default().with_test(Box::new(AlwaysTest));
        let classification = classifier.classify(Some(&reduced_frame(body)));
        assert_eq!(classification.label, PoseLabel::TPose);
        assert!(classification.reference_points.is_some());
    }
}
