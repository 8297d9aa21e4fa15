// Overlay projector - turns a staged frame into pixel-space skeleton primitives

use crate::core::topology::{self, JointLayout};
use crate::models::landmark::{Joint, LandmarkFrame};
use crate::models::overlay::{Marker, MarkerStyle, Overlay, PixelPoint, Segment, SegmentStyle};
use crate::models::pose::{Classification, WorldPoint};

fn to_pixel(x: f64, y: f64, width: u32, height: u32) -> PixelPoint {
    // `as` truncates toward zero
    PixelPoint::new((x * width as f64) as i32, (y * height as f64) as i32)
}

fn joint_to_pixel(joint: &Joint, width: u32, height: u32) -> PixelPoint {
    to_pixel(joint.x as f64, joint.y as f64, width, height)
}

/// Project a frame onto an image of `width` x `height` pixels.
///
/// One segment per bone of the frame's topology and one marker per joint.
/// When the classification recognized a pose its arm bones are highlighted,
/// and if it carries reference points a neck-to-hip debug line with two
/// extra markers is appended.
pub fn project(
    frame: Option<&LandmarkFrame>,
    classification: &Classification,
    width: u32,
    height: u32,
) -> Overlay {
    let frame = match frame {
        Some(frame) => frame,
        None => return Overlay::default(),
    };

    let mode = frame.mode();
    let joints = frame.image_landmarks();
    let highlight = classification.is_recognized();

    let mut overlay = Overlay::default();

    for &connection in topology::connections(mode) {
        let (start, end) = match (joints.get(connection.0), joints.get(connection.1)) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                tracing::warn!(?connection, joints = joints.len(), "Connection outside frame, skipped");
                continue;
            }
        };

        let style = if highlight && topology::is_arm_connection(mode, connection) {
            SegmentStyle::Highlight
        } else {
            SegmentStyle::Normal
        };

        overlay.segments.push(Segment {
            start: joint_to_pixel(start, width, height),
            end: joint_to_pixel(end, width, height),
            style,
        });
    }

    overlay.markers.extend(joints.iter().map(|joint| Marker {
        position: joint_to_pixel(joint, width, height),
        style: MarkerStyle::Joint,
    }));

    if let Some(refs) = classification.reference_points.filter(|_| highlight) {
        let layout = JointLayout::for_mode(mode);
        if let Some(segment) = reference_segment(joints, &layout, width, height) {
            overlay.segments.push(segment);
        }
        overlay.markers.push(reference_marker(&refs.neck));
        overlay.markers.push(reference_marker(&refs.hip));
    }

    overlay
}

/// Line between the shoulder and hip joint sums in image space. These sums
/// are scaled by the image size as-is, so the line is not drawn through the
/// classifier's reference points.
fn reference_segment(joints: &[Joint], layout: &JointLayout, width: u32, height: u32) -> Option<Segment> {
    let sum = |a: usize, b: usize| -> Option<(f64, f64)> {
        let (a, b) = (joints.get(a)?, joints.get(b)?);
        Some((a.x as f64 + b.x as f64, a.y as f64 + b.y as f64))
    };

    let (nx, ny) = sum(layout.left_shoulder, layout.right_shoulder)?;
    let (hx, hy) = sum(layout.left_hip, layout.right_hip)?;

    Some(Segment {
        start: to_pixel(nx, ny, width, height),
        end: to_pixel(hx, hy, width, height),
        style: SegmentStyle::Reference,
    })
}

/// Reference points are world-space sums and are placed without scaling.
fn reference_marker(point: &WorldPoint) -> Marker {
    Marker {
        position: PixelPoint::new(point.x as i32, point.y as i32),
        style: MarkerStyle::Reference,
    }
}
