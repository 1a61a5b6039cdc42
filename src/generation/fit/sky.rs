//! Floating structures.

use rand::{Rng, RngCore};

use super::streak::air_streak;
use super::{chunk_shift, ring_offsets, FitContext, FitStrategy, PlacementCandidate};
use crate::generation::terrain_scan::{self, ScanKind};
use crate::template::Template;
use crate::voxel::{Environment, Location};

/// Nether air streak probe range `[from, to)`
const NETHER_PROBE_FROM: i32 = 45;
const NETHER_PROBE_TO: i32 = 100;

/// Sky placement: a fixed or random altitude above the terrain, or the
/// middle of a tall air pocket in the Nether. Only completely open air is
/// accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkyFit;

impl FitStrategy for SkyFit {
    fn vertical_placement(&self, ctx: &FitContext<'_>, base: Location, rng: &mut dyn RngCore) -> Option<Location> {
        let altitudes = ctx.config.sky_altitudes;
        match ctx.environment() {
            Environment::Nether => {
                let column = base.block_pos();
                let streak = air_streak(ctx.world, column.x, column.z, NETHER_PROBE_FROM, NETHER_PROBE_TO)?;
                streak.placement_y(rng).map(|y| base.with_y(y))
            }
            Environment::End => Some(base.with_y(base.y + altitudes.end_min)),
            Environment::Overworld | Environment::Custom => {
                let (low, high) = (altitudes.min.min(altitudes.max), altitudes.min.max(altitudes.max));
                Some(base.with_y(base.y + rng.gen_range(low..=high)))
            }
        }
    }

    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate> {
        ring_offsets(ctx.search_radius())
            .map(|offset| {
                let location = chunk_shift(&start, offset);
                let adequacy = terrain_scan::scan(ctx.world, template, &location, ctx.stride(), ScanKind::Air);
                PlacementCandidate::from_adequacy(location, adequacy)
            })
            .find(|candidate| self.accepts(ctx, candidate))
    }

    fn accepts(&self, _ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool {
        candidate.adequacy >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::generation::config::PlacementConfig;
    use crate::voxel::{ChunkCoord, GridWorld, Material, VoxelWorld};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn island() -> Template {
        Template::solid("island", IVec3::new(5, 3, 5), IVec3::new(2, 0, 2), Material::Dirt).unwrap()
    }

    #[test]
    fn test_overworld_altitude_range() {
        let mut world = GridWorld::overworld(0);
        world.fill(IVec3::new(0, 0, 0), IVec3::new(15, 70, 15), Material::Stone);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let base = SkyFit.base_location(&ctx, ChunkCoord::new(0, 0));
        assert_eq!(base.y, 70);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let y = SkyFit.vertical_placement(&ctx, base, &mut rng).unwrap().y;
            assert!((150..=190).contains(&y));
        }
    }

    #[test]
    fn test_end_fixed_altitude() {
        let mut world = GridWorld::end(0);
        world.fill(IVec3::new(0, 0, 0), IVec3::new(15, 60, 15), Material::EndStone);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let base = SkyFit.base_location(&ctx, ChunkCoord::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(SkyFit.vertical_placement(&ctx, base, &mut rng).unwrap().y, 90);
    }

    #[test]
    fn test_nether_air_pocket() {
        let mut world = GridWorld::nether(0);
        world.fill(IVec3::new(0, 0, 0), IVec3::new(15, 49, 15), Material::Netherrack);
        world.fill(IVec3::new(0, 76, 0), IVec3::new(15, 127, 15), Material::Netherrack);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let base = SkyFit.base_location(&ctx, ChunkCoord::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // Streak 50..=78 spans 28, so the placement sits just above the floor
        assert_eq!(SkyFit.vertical_placement(&ctx, base, &mut rng).unwrap().y, 51);

        let mut closed = GridWorld::nether(0);
        closed.fill(IVec3::new(0, 0, 0), IVec3::new(15, 127, 15), Material::Netherrack);
        let ctx = FitContext::new(&closed, &config);
        let base = SkyFit.base_location(&ctx, ChunkCoord::new(0, 0));
        assert!(SkyFit.vertical_placement(&ctx, base, &mut rng).is_none());
    }

    #[test]
    fn test_nether_unloaded_column_rejected() {
        let world = GridWorld::nether(0);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let base = Location::new(world.id(), 8.0, 64, 8.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(SkyFit.vertical_placement(&ctx, base, &mut rng).is_none());
    }

    #[test]
    fn test_search_takes_first_open_chunk() {
        let mut world = GridWorld::overworld(0);
        world.load_area(ChunkCoord::new(-1, -1), ChunkCoord::new(1, 1));
        // Obstruct the lowest corner of the center placement
        world.set_block(IVec3::new(6, 150, 6), Material::Stone);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let start = Location::new(world.id(), 8.0, 150, 8.0);

        let found = SkyFit.search(&ctx, &island(), start).unwrap();
        assert_eq!(found.adequacy, 100.0);
        // First ring entry is (-1, -1)
        assert_eq!(found.location.block_pos(), IVec3::new(-8, 150, -8));
    }

    #[test]
    fn test_search_fails_in_void() {
        let world = GridWorld::overworld(0);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let start = Location::new(world.id(), 8.0, 150, 8.0);
        assert!(SkyFit.search(&ctx, &island(), start).is_none());
    }
}
