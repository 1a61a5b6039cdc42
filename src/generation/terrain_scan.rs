//! Terrain adequacy scanning.
//!
//! Samples a template's grid on a stride, projects each sample into the world
//! and counts how many world blocks suit the placement kind. The score is the
//! adequate percentage in `[0, 100]`.

use crate::core::types::IVec3;
use crate::template::Template;
use crate::voxel::{Location, Material, VoxelWorld};

/// Adequacy rule set applied to each sampled block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanKind {
    /// Ground below the floor, buildable space above it
    Surface,
    /// Open air everywhere
    Air,
    /// Solid rock everywhere
    Underground,
    /// Air above the floor, liquid where the template expects liquid
    Liquid,
}

/// Classify one world block against the template block that would replace it
#[inline]
fn is_adequate(kind: ScanKind, world: Material, template: Material, world_y: i32, floor_y: i32) -> bool {
    if world == Material::VoidAir {
        return false;
    }

    match kind {
        ScanKind::Surface => {
            if world_y > floor_y {
                world.is_ignorable() || !template.is_air()
            } else {
                !world.is_air()
            }
        }
        ScanKind::Air => world.is_air(),
        ScanKind::Underground => world.is_solid(),
        ScanKind::Liquid => {
            if world_y > floor_y {
                world.is_air()
            } else if template.is_liquid() {
                world.is_liquid()
            } else {
                true
            }
        }
    }
}

/// Score how well `template`, anchored at `anchor`, fits the world.
///
/// # Arguments
/// * `world` - World to read
/// * `template` - Template being placed
/// * `anchor` - Placement location; the floor is one block below it
/// * `stride` - Sample every `stride`-th cell on each axis, starting at 0
/// * `kind` - Adequacy rule set
///
/// Returns a score in `[0, 100]`. An empty template scores 0.
pub fn scan(world: &dyn VoxelWorld, template: &Template, anchor: &Location, stride: i32, kind: ScanKind) -> f64 {
    let stride = stride.max(1) as usize;
    let size = template.size();
    let base = template.lowest_corner(anchor);
    let floor_y = anchor.y - 1;

    let mut total = 0u32;
    let mut adequate = 0u32;

    for x in (0..size.x).step_by(stride) {
        for y in (0..size.y).step_by(stride) {
            for z in (0..size.z).step_by(stride) {
                let local = IVec3::new(x, y, z);
                let pos = base + local;
                if is_adequate(kind, world.block(pos), template.material(local), pos.y, floor_y) {
                    adequate += 1;
                }
                total += 1;
            }
        }
    }

    if total == 0 {
        return 0.0;
    }
    100.0 * adequate as f64 / total as f64
}
