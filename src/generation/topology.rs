//! Footprint flatness scoring.
//!
//! Finds the surface under each sampled footprint column, penalizes liquid
//! and uneven ground, and snaps the placement height to the mean surface.

use crate::core::types::IVec3;
use crate::template::Template;
use crate::voxel::{Environment, Location, VoxelWorld};

/// Span between the highest and lowest sampled surface that rejects a footprint
pub const MAX_HEIGHT_SPAN: i32 = 20;

/// Running score below which liquid penalties reject the footprint
const LIQUID_REJECT_SCORE: f64 = 75.0;

/// Running score below which height penalties reject the footprint
const VARIATION_REJECT_SCORE: f64 = 85.0;

/// Deviations from the mean below this are free
const FREE_DEVIATION: i32 = 3;

// Nether surface probe bounds
const NETHER_PROBE_START_Y: i32 = 63;
const NETHER_PROBE_MIN_Y: i32 = 30;
const NETHER_PROBE_MAX_Y: i32 = 100;
const NETHER_CLEARANCE: i32 = 10;

/// Result of a topology scan
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Topology {
    /// Final score, never negative. 0 means rejected.
    pub score: f64,
    /// Placement height snapped to one above the mean surface, or the
    /// original height when the scan stopped before computing it
    pub anchor_y: i32,
}

impl Topology {
    fn rejected(anchor_y: i32) -> Self {
        Self { score: 0.0, anchor_y }
    }

    pub fn is_rejected(&self) -> bool {
        self.score <= 0.0
    }
}

/// Nether surface at a column: the first non-ignorable block with at least
/// ten ignorable blocks above it, searching outward from y = 63.
pub fn nether_surface_y(world: &dyn VoxelWorld, x: i32, z: i32) -> Option<i32> {
    let is_surface = |y: i32| {
        if world.block(IVec3::new(x, y, z)).is_ignorable() || !world.block(IVec3::new(x, y + 1, z)).is_ignorable() {
            return false;
        }
        let top = (y + 2 + NETHER_CLEARANCE).min(world.max_height());
        (y + 2..top).all(|i| world.block(IVec3::new(x, i, z)).is_ignorable())
    };

    if world.block(IVec3::new(x, NETHER_PROBE_START_Y, z)).is_ignorable() {
        (NETHER_PROBE_MIN_Y + 1..=NETHER_PROBE_START_Y).rev().find(|&y| is_surface(y))
    } else {
        (NETHER_PROBE_START_Y..NETHER_PROBE_MAX_Y).find(|&y| is_surface(y))
    }
}

/// Surface height of a column for the world's environment
pub fn surface_y(world: &dyn VoxelWorld, x: i32, z: i32) -> Option<i32> {
    match world.environment() {
        Environment::Nether => nether_surface_y(world, x, z),
        _ => world.highest_block_y(x, z),
    }
}

/// Score the footprint of `template` anchored at `origin`.
///
/// # Arguments
/// * `world` - World to read
/// * `starting_score` - Score before penalties (100, or 200 in the Nether)
/// * `stride` - Column sampling stride on x and z
/// * `template` - Template whose footprint is scanned
/// * `origin` - Placement location
pub fn scan(world: &dyn VoxelWorld, starting_score: f64, stride: i32, template: &Template, origin: &Location) -> Topology {
    let stride = stride.max(1);
    let base = template.lowest_corner(origin);
    let columns_x = (template.width() + stride - 1) / stride;
    let columns_z = (template.depth() + stride - 1) / stride;
    let sampled = (columns_x * columns_z).max(0) as usize;
    if sampled == 0 {
        return Topology::rejected(origin.y);
    }

    // --- Surface sampling and liquid penalty ---

    let liquid_penalty = 50.0 / sampled as f64;
    let mut score = starting_score;
    let mut heights = Vec::with_capacity(sampled);

    for x in (0..template.width()).step_by(stride as usize) {
        for z in (0..template.depth()).step_by(stride as usize) {
            let (wx, wz) = (base.x + x, base.z + z);
            let Some(y) = surface_y(world, wx, wz) else {
                return Topology::rejected(origin.y);
            };

            if world.block(IVec3::new(wx, y, wz)).is_liquid() {
                score -= liquid_penalty;
                if score < LIQUID_REJECT_SCORE {
                    return Topology::rejected(origin.y);
                }
            }
            heights.push(y);
        }
    }

    // --- Height span ---

    let (min, max) = heights
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &h| (lo.min(h), hi.max(h)));
    if max - min >= MAX_HEIGHT_SPAN {
        return Topology::rejected(origin.y);
    }

    let n = heights.len() as i64;
    let sum: i64 = heights.iter().map(|&h| h as i64).sum();
    let mean = sum.div_euclid(n) as i32;
    let anchor_y = mean + 1;

    // --- Deviation penalty, at most half the score in total ---

    let max_impact = score * 0.5 / n as f64;
    for &h in &heights {
        let d = (h - mean).abs();
        if d < FREE_DEVIATION {
            continue;
        }
        let weight = (0.04 * (d * d) as f64).min(1.0);
        score -= weight * max_impact;
        if score < VARIATION_REJECT_SCORE {
            return Topology::rejected(anchor_y);
        }
    }

    Topology { score: score.max(0.0), anchor_y }
}
