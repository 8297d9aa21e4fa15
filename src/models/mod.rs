// Data models for landmark frames, pose classification, and overlay primitives

pub mod landmark;
pub mod overlay;
pub mod pose;
