//! Structures floating on water or lava.

use rand::RngCore;

use super::{chunk_shift, ring_offsets, BestCandidate, FitContext, FitStrategy, PlacementCandidate};
use crate::core::types::IVec3;
use crate::generation::terrain_scan::{self, ScanKind};
use crate::template::Template;
use crate::voxel::{Environment, Location, Material};

/// Lowest liquid adequacy a candidate needs
pub const MIN_LIQUID_ADEQUACY: f64 = 90.0;

/// Nether lava sea level
const NETHER_LAVA_Y: i32 = 31;

/// Open air required above the Nether lava sea
const NETHER_LAVA_CLEARANCE: i32 = 20;

/// Liquid surface placement: the base column must end in liquid and the
/// template must sit on it with open air above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidFit;

impl LiquidFit {
    fn nether_lava_sea(ctx: &FitContext<'_>, base: Location) -> Option<Location> {
        let column = base.block_pos();
        if ctx.world.block(IVec3::new(column.x, NETHER_LAVA_Y, column.z)) != Material::Lava {
            return None;
        }
        for y in NETHER_LAVA_Y + 1..=NETHER_LAVA_Y + NETHER_LAVA_CLEARANCE {
            if y >= ctx.world.max_height() {
                break;
            }
            if !ctx.world.block(IVec3::new(column.x, y, column.z)).is_air() {
                return None;
            }
        }
        Some(base.with_y(NETHER_LAVA_Y))
    }
}

impl FitStrategy for LiquidFit {
    fn vertical_placement(&self, ctx: &FitContext<'_>, base: Location, _rng: &mut dyn RngCore) -> Option<Location> {
        match ctx.environment() {
            Environment::Overworld | Environment::Custom => {
                ctx.world.block(base.block_pos()).is_liquid().then_some(base)
            }
            Environment::Nether => Self::nether_lava_sea(ctx, base),
            Environment::End => None,
        }
    }

    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate> {
        let mut best = BestCandidate::new();
        for offset in ring_offsets(ctx.search_radius()) {
            let location = chunk_shift(&start, offset).with_y(start.y + 1);
            let adequacy = terrain_scan::scan(ctx.world, template, &location, ctx.stride(), ScanKind::Liquid);
            let candidate = PlacementCandidate::from_adequacy(location, adequacy);
            if !self.accepts(ctx, &candidate) {
                continue;
            }
            best.offer(candidate);
            if best.score() >= MIN_LIQUID_ADEQUACY {
                break;
            }
        }
        best.into_inner()
    }

    fn accepts(&self, _ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool {
        candidate.adequacy >= MIN_LIQUID_ADEQUACY
    }
}
