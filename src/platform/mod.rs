// Integration points with external engines

pub mod pose;
