//! Buried structures.

use rand::{Rng, RngCore};

use super::streak::solid_streak;
use super::{chunk_center, chunk_shift, square_offsets, BestCandidate, FitContext, FitStrategy, PlacementCandidate};
use crate::generation::config::HeightBand;
use crate::generation::terrain_scan::{self, ScanKind};
use crate::generation::variant::StructureVariant;
use crate::template::Template;
use crate::voxel::{ChunkCoord, Environment, Location};

/// Adequacy that ends the search early
pub const GOOD_ENOUGH_ADEQUACY: f64 = 90.0;

/// Lowest adequacy accepted in the Nether
const NETHER_MIN_ADEQUACY: f64 = 50.0;

/// Lowest adequacy accepted everywhere else
const MIN_ADEQUACY: f64 = 70.0;

/// Underground placement, shallow or deep.
///
/// The starting height comes from the variant's band: uniform in the
/// Overworld, a solid streak probe in the Nether and (shallow only) the End.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UndergroundFit {
    deep: bool,
}

impl UndergroundFit {
    pub const fn shallow() -> Self {
        Self { deep: false }
    }

    pub const fn deep() -> Self {
        Self { deep: true }
    }

    pub fn variant(&self) -> StructureVariant {
        if self.deep {
            StructureVariant::UndergroundDeep
        } else {
            StructureVariant::UndergroundShallow
        }
    }

    fn min_adequacy(env: Environment) -> f64 {
        match env {
            Environment::Nether => NETHER_MIN_ADEQUACY,
            _ => MIN_ADEQUACY,
        }
    }
}

/// Move a placement height back inside the world's vertical bounds.
///
/// Uses the template's vertical anchor distance and height.
pub fn clamp_to_bounds(y: i32, template: &Template, bounds: HeightBand) -> i32 {
    let offset = template.origin_offset().y.abs();
    let height = template.height();
    if y - offset < bounds.low {
        bounds.low + 1 + offset
    } else if y + offset - height > bounds.high {
        bounds.high - height + offset
    } else {
        y
    }
}

impl FitStrategy for UndergroundFit {
    fn base_location(&self, ctx: &FitContext<'_>, chunk: ChunkCoord) -> Location {
        chunk_center(ctx.world, chunk, 0)
    }

    fn vertical_placement(&self, ctx: &FitContext<'_>, base: Location, rng: &mut dyn RngCore) -> Option<Location> {
        let env = ctx.environment();
        let band = ctx.config.underground_band(self.variant(), env);
        let column = base.block_pos();

        let y = match env {
            Environment::Nether => {
                solid_streak(ctx.world, column.x, column.z, band.low, band.high, self.deep)?.placement_y(rng)?
            }
            Environment::End if self.deep => base.y,
            Environment::End => solid_streak(ctx.world, column.x, column.z, band.low, band.high, false)?.placement_y(rng)?,
            Environment::Overworld | Environment::Custom => {
                if band.low >= band.high {
                    return None;
                }
                rng.gen_range(band.low..band.high)
            }
        };
        Some(base.with_y(y))
    }

    fn search(&self, ctx: &FitContext<'_>, template: &Template, start: Location) -> Option<PlacementCandidate> {
        let bounds = ctx.config.vertical_bounds.get(ctx.environment());
        let start = start.with_y(clamp_to_bounds(start.y, template, bounds));

        let mut best = BestCandidate::new();
        for offset in square_offsets(ctx.search_radius()) {
            let location = chunk_shift(&start, offset);
            let adequacy = terrain_scan::scan(ctx.world, template, &location, ctx.stride(), ScanKind::Underground);
            let candidate = PlacementCandidate::from_adequacy(location, adequacy);
            if self.accepts(ctx, &candidate) {
                best.offer(candidate);
            }
            if best.score() >= GOOD_ENOUGH_ADEQUACY {
                break;
            }
        }
        best.into_inner()
    }

    fn accepts(&self, ctx: &FitContext<'_>, candidate: &PlacementCandidate) -> bool {
        candidate.adequacy >= Self::min_adequacy(ctx.environment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::generation::config::PlacementConfig;
    use crate::voxel::{GridWorld, Material, VoxelWorld, WorldId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pebble() -> Template {
        Template::solid("pebble", IVec3::ONE, IVec3::ZERO, Material::Cobblestone).unwrap()
    }

    fn nether_config() -> PlacementConfig {
        let mut config = PlacementConfig::default();
        config.shallow_band.nether = HeightBand::new(5, 100);
        config
    }

    fn find(world: &GridWorld, config: &PlacementConfig, seed: u64) -> Option<PlacementCandidate> {
        let ctx = FitContext::new(world, config);
        let fit = UndergroundFit::shallow();
        let base = fit.base_location(&ctx, ChunkCoord::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start = fit.vertical_placement(&ctx, base, &mut rng)?;
        fit.search(&ctx, &pebble(), start)
    }

    #[test]
    fn test_thin_column_sits_above_floor() {
        let mut world = GridWorld::nether(0);
        world.fill_column(8, 8, 10, 30, Material::Netherrack);
        // Streak 10..=33 including tolerance, 23 blocks
        let found = find(&world, &nether_config(), 0).unwrap();
        assert_eq!(found.adequacy, 100.0);
        assert_eq!(found.location.y, 11);
    }

    #[test]
    fn test_thick_column_randomized() {
        let mut world = GridWorld::nether(0);
        world.fill_column(8, 8, 10, 40, Material::Netherrack);
        // The 3-block tolerance runs the streak through the air above to 43,
        // so placements are drawn from [11, 23) rather than [11, 20)
        for seed in 0..20 {
            let found = find(&world, &nether_config(), seed).unwrap();
            assert_eq!(found.adequacy, 100.0);
            assert!((11..23).contains(&found.location.y), "y = {}", found.location.y);
        }
    }

    #[test]
    fn test_column_capped_by_world_top() {
        // Solid from 10 to 40 with the world ending at 41, so no tolerance applies
        let mut world = GridWorld::new(WorldId(1), 0, Environment::Nether, 0, 41);
        world.fill_column(8, 8, 10, 40, Material::Netherrack);
        for seed in 0..20 {
            let found = find(&world, &nether_config(), seed).unwrap();
            assert_eq!(found.adequacy, 100.0);
            assert!((11..20).contains(&found.location.y), "y = {}", found.location.y);
        }
    }

    #[test]
    fn test_short_column_rejected() {
        let mut world = GridWorld::nether(0);
        world.fill_column(8, 8, 10, 20, Material::Netherrack);
        assert!(find(&world, &nether_config(), 0).is_none());
    }

    #[test]
    fn test_overworld_band() {
        let mut world = GridWorld::overworld(0);
        world.fill(IVec3::new(0, -64, 0), IVec3::new(15, 70, 15), Material::Stone);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let fit = UndergroundFit::deep();
        let base = fit.base_location(&ctx, ChunkCoord::new(0, 0));
        assert_eq!(base.y, 0);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let start = fit.vertical_placement(&ctx, base, &mut rng).unwrap();
            assert!((-55..0).contains(&start.y));
            let found = fit.search(&ctx, &pebble(), start).unwrap();
            assert_eq!(found.location, start);
        }
    }

    #[test]
    fn test_end_deep_keeps_zero() {
        let world = GridWorld::end(0);
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let fit = UndergroundFit::deep();
        let base = fit.base_location(&ctx, ChunkCoord::new(0, 0));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(fit.vertical_placement(&ctx, base, &mut rng).map(|l| l.y), Some(0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let t = Template::solid("vault", IVec3::new(5, 10, 5), IVec3::new(2, 3, 2), Material::StoneBricks).unwrap();
        let bounds = HeightBand::new(-60, 320);
        assert_eq!(clamp_to_bounds(-59, &t, bounds), -56);
        assert_eq!(clamp_to_bounds(0, &t, bounds), 0);
        assert_eq!(clamp_to_bounds(330, &t, bounds), 313);
    }

    #[test]
    fn test_nether_accepts_half_solid() {
        let mut world = GridWorld::nether(0);
        world.fill(IVec3::new(0, 40, 0), IVec3::new(15, 41, 15), Material::Netherrack);
        let slab = Template::solid("slab", IVec3::new(1, 4, 1), IVec3::ZERO, Material::Cobblestone).unwrap();
        let config = PlacementConfig::default();
        let ctx = FitContext::new(&world, &config);
        let start = Location::new(world.id(), 8.0, 40, 8.0);
        let fit = UndergroundFit::shallow();
        let found = fit.search(&ctx, &slab, start).unwrap();
        assert_eq!(found.adequacy, 50.0);

        let mut overworld = GridWorld::overworld(0);
        overworld.fill(IVec3::new(0, 40, 0), IVec3::new(15, 41, 15), Material::Stone);
        let ctx = FitContext::new(&overworld, &config);
        assert!(fit.search(&ctx, &slab, start).is_none());
    }
}
