// Reference renderer - draws an overlay onto an RGB image buffer

use crate::core::config::OverlayStyle;
use crate::models::overlay::{MarkerStyle, Overlay, PixelPoint, Segment, SegmentStyle};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

fn segment_color(style: &OverlayStyle, segment: &Segment) -> Rgb<u8> {
    match segment.style {
        SegmentStyle::Normal => Rgb(style.normal_color),
        SegmentStyle::Highlight | SegmentStyle::Reference => Rgb(style.highlight_color),
    }
}

/// Clip a segment to the canvas grown by `margin` on every side
/// (Liang-Barsky). Returns `None` when nothing of it is near the canvas.
fn clip_segment(
    start: (f64, f64),
    end: (f64, f64),
    width: u32,
    height: u32,
    margin: f64,
) -> Option<((f64, f64), (f64, f64))> {
    let (min_x, min_y) = (-margin, -margin);
    let (max_x, max_y) = (width as f64 + margin, height as f64 + margin);
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-dx, start.0 - min_x),
        (dx, max_x - start.0),
        (-dy, start.1 - min_y),
        (dy, max_y - start.1),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

/// Draw a line of the given thickness as parallel one-pixel lines offset
/// along the segment normal.
fn draw_thick_segment(image: &mut RgbImage, segment: &Segment, thickness: u32, color: Rgb<u8>) {
    let start = (segment.start.x as f64, segment.start.y as f64);
    let end = (segment.end.x as f64, segment.end.y as f64);
    let ((x1, y1), (x2, y2)) =
        match clip_segment(start, end, image.width(), image.height(), thickness as f64 + 1.0) {
            Some(clipped) => clipped,
            None => return,
        };

    let length = ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt();
    let (nx, ny) = if length > 0.0 {
        (-(y2 - y1) / length, (x2 - x1) / length)
    } else {
        (0.0, 0.0)
    };

    let half = (thickness as f64 - 1.0) / 2.0;
    for t in 0..thickness {
        let offset = t as f64 - half;
        draw_line_segment_mut(
            image,
            ((x1 + nx * offset) as f32, (y1 + ny * offset) as f32),
            ((x2 + nx * offset) as f32, (y2 + ny * offset) as f32),
            color,
        );
    }
}

/// True when a circle of `radius` around `position` touches the image
fn marker_visible(image: &RgbImage, position: PixelPoint, radius: i64) -> bool {
    let (x, y) = (position.x as i64, position.y as i64);
    x >= -radius
        && y >= -radius
        && x <= image.width() as i64 + radius
        && y <= image.height() as i64 + radius
}

/// Draw every segment, then every marker, onto `image`.
///
/// Segments are clipped to the image before drawing and markers that cannot
/// touch the image are skipped.
pub fn render_overlay(image: &mut RgbImage, overlay: &Overlay, style: &OverlayStyle) {
    for segment in &overlay.segments {
        let color = segment_color(style, segment);
        draw_thick_segment(image, segment, style.line_thickness, color);
    }

    let radius = style.point_radius.min(i32::MAX as u32) as i32;
    for marker in &overlay.markers {
        if !marker_visible(image, marker.position, radius as i64) {
            tracing::trace!(x = marker.position.x, y = marker.position.y, "Marker off canvas, skipped");
            continue;
        }
        let color = match marker.style {
            MarkerStyle::Joint | MarkerStyle::Reference => Rgb(style.point_color),
        };
        draw_filled_circle_mut(image, (marker.position.x, marker.position.y), radius, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::landmark::{Joint, LandmarkFrame};
    use crate::models::overlay::Marker;
    use crate::models::pose::{Classification, PoseLabel, ReferencePoints, WorldPoint};

    #[test]
    fn test_render_segment_and_marker() {
        let style = OverlayStyle::default();
        let overlay = Overlay {
            segments: vec![Segment {
                start: PixelPoint::new(10, 50),
                end: PixelPoint::new(90, 50),
                style: SegmentStyle::Highlight,
            }],
            markers: vec![Marker {
                position: PixelPoint::new(20, 20),
                style: MarkerStyle::Joint,
            }],
        };

        let mut image = RgbImage::new(100, 100);
        render_overlay(&mut image, &overlay, &style);

        assert_eq!(*image.get_pixel(50, 50), Rgb(style.highlight_color));
        assert_eq!(*image.get_pixel(20, 20), Rgb(style.point_color));
        assert_eq!(*image.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_normal_segment_color() {
        let style = OverlayStyle::default();
        let overlay = Overlay {
            segments: vec![Segment {
                start: PixelPoint::new(50, 0),
                end: PixelPoint::new(50, 99),
                style: SegmentStyle::Normal,
            }],
            markers: vec![],
        };

        let mut image = RgbImage::new(100, 100);
        render_overlay(&mut image, &overlay, &style);
        assert_eq!(*image.get_pixel(50, 70), Rgb(style.normal_color));
    }

    #[test]
    fn test_out_of_bounds_primitives_are_clipped() {
        let overlay = Overlay {
            segments: vec![Segment {
                start: PixelPoint::new(-500, -500),
                end: PixelPoint::new(-400, -400),
                style: SegmentStyle::Normal,
            }],
            markers: vec![Marker {
                position: PixelPoint::new(5000, 5000),
                style: MarkerStyle::Reference,
            }],
        };

        let mut image = RgbImage::new(10, 10);
        render_overlay(&mut image, &overlay, &OverlayStyle::default());
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_far_reference_markers_do_not_overflow() {
        let frame = LandmarkFrame::new(
            0,
            vec![Joint::new(0.5, 0.5, 0.0); 33],
            vec![Joint::new(0.0, 0.0, 0.0); 33],
        )
        .unwrap();
        let far = WorldPoint { x: 3e9, y: 3e9, z: 0.0 };
        let classification = Classification::matched(PoseLabel::TPose, ReferencePoints { neck: far, hip: far });
        let overlay = crate::core::overlay_projector::project(Some(&frame), &classification, 64, 48);
        assert_eq!(overlay.markers.last().unwrap().position, PixelPoint::new(i32::MAX, i32::MAX));

        let mut image = RgbImage::new(64, 48);
        render_overlay(&mut image, &overlay, &OverlayStyle::default());
        assert_eq!(*image.get_pixel(32, 24), Rgb(OverlayStyle::default().point_color));
    }

    #[test]
    fn test_extreme_segment_is_clipped_to_canvas() {
        let style = OverlayStyle { line_thickness: 1, ..OverlayStyle::default() };
        let overlay = Overlay {
            segments: vec![
                Segment {
                    start: PixelPoint::new(i32::MIN, 5),
                    end: PixelPoint::new(i32::MAX, 5),
                    style: SegmentStyle::Normal,
                },
                Segment {
                    start: PixelPoint::new(i32::MAX, i32::MAX),
                    end: PixelPoint::new(i32::MAX, i32::MIN),
                    style: SegmentStyle::Highlight,
                },
            ],
            markers: vec![Marker {
                position: PixelPoint::new(i32::MIN, i32::MAX),
                style: MarkerStyle::Joint,
            }],
        };

        let mut image = RgbImage::new(10, 10);
        render_overlay(&mut image, &overlay, &style);
        for x in 0..10 {
            assert_eq!(*image.get_pixel(x, 5), Rgb(style.normal_color));
        }
        assert_eq!(*image.get_pixel(5, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_clip_segment() {
        let ((x1, y1), (x2, y2)) = clip_segment((-100.0, 5.0), (100.0, 5.0), 10, 10, 1.0).unwrap();
        assert!((x1 - -1.0).abs() < 1e-9 && (x2 - 11.0).abs() < 1e-9);
        assert_eq!((y1, y2), (5.0, 5.0));

        assert!(clip_segment((-100.0, -50.0), (100.0, -50.0), 10, 10, 1.0).is_none());
        assert!(clip_segment((20.0, 0.0), (30.0, 10.0), 10, 10, 1.0).is_none());

        let inside = clip_segment((2.0, 3.0), (7.0, 8.0), 10, 10, 1.0).unwrap();
        assert_eq!(inside, ((2.0, 3.0), (7.0, 8.0)));
    }
}
