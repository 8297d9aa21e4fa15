// Pixel-space primitives handed to the renderer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStyle {
    /// Plain skeleton bone
    Normal,
    /// Bone that belongs to the recognized pose
    Highlight,
    /// Neck-to-hip debug line
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    Joint,
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: PixelPoint,
    pub end: PixelPoint,
    pub style: SegmentStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub position: PixelPoint,
    pub style: MarkerStyle,
}

/// Everything drawn for one frame
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub segments: Vec<Segment>,
    pub markers: Vec<Marker>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.markers.is_empty()
    }

    pub fn segments_with_style(&self, style: SegmentStyle) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(move |s| s.style == style)
    }

    pub fn markers_with_style(&self, style: MarkerStyle) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.style == style)
    }
}
