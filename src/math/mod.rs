//! Mathematical utilities

pub mod aabb;
pub mod weighted;

pub use aabb::BlockBox;
pub use weighted::{pick_weighted, pick_weighted_or, WeightedTable};
