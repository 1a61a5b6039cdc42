//! Terrafit - terrain-fitting structure placement for chunked voxel worlds

pub mod core;
pub mod math;
pub mod voxel;
pub mod template;
pub mod generation;
pub mod paste;
