//! Template decomposition into block writes.

use std::collections::BTreeMap;

use rand::RngCore;

use crate::core::types::IVec3;
use crate::generation::variant::StructureVariant;
use crate::math::WeightedTable;
use crate::template::Template;
use crate::voxel::{BlockState, Environment, Location, Material, VoxelWorld};

/// Blocks scanned per column when sampling the surface pedestal pool
const SURFACE_SAMPLE_DEPTH: i32 = 20;

/// One pending block write
#[derive(Clone, Debug, PartialEq)]
pub enum SubWrite {
    /// Plain material change
    Direct { pos: IVec3, material: Material },
    /// Block carrying state, written through [`VoxelWorld::write_complex`]
    Complex { pos: IVec3, block: BlockState },
}

impl SubWrite {
    pub fn pos(&self) -> IVec3 {
        match self {
            SubWrite::Direct { pos, .. } | SubWrite::Complex { pos, .. } => *pos,
        }
    }

    pub fn material(&self) -> Material {
        match self {
            SubWrite::Direct { material, .. } => *material,
            SubWrite::Complex { block, .. } => block.material,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, SubWrite::Complex { .. })
    }
}

/// Materials used to fill the ground under and around a placed template.
///
/// Sampled from the terrain before anything is written so the pedestal
/// blends in. Surface pedestals (open above) and underground pedestals
/// (covered) draw from separate pools.
#[derive(Clone, Debug)]
pub struct PedestalPalette {
    surface: WeightedTable<Material>,
    underground: WeightedTable<Material>,
    fallback: Material,
}

impl PedestalPalette {
    /// Palette that always yields `fallback`
    pub fn fallback_only(fallback: Material) -> Self {
        Self {
            surface: WeightedTable::new(std::iter::empty()),
            underground: WeightedTable::new(std::iter::empty()),
            fallback,
        }
    }

    /// Fallback material: the template's own pedestal, else the
    /// environment default
    pub fn fallback_for(template: &Template, env: Environment) -> Material {
        template.pedestal().unwrap_or_else(|| env.default_pedestal())
    }

    /// Sample the terrain around a placement.
    ///
    /// Sky placements float, so they only get the fallback.
    pub fn sample(world: &dyn VoxelWorld, template: &Template, location: &Location, variant: StructureVariant) -> Self {
        let fallback = Self::fallback_for(template, world.environment());
        if variant == StructureVariant::Sky {
            return Self::fallback_only(fallback);
        }

        let base = template.lowest_corner(location);
        let size = template.size();

        // Covered solid ground inside the footprint volume
        let mut underground: BTreeMap<Material, u32> = BTreeMap::new();
        for x in 0..size.x {
            for z in 0..size.z {
                for y in 0..size.y {
                    let pos = base + IVec3::new(x, y, z);
                    let ground = world.block(pos);
                    if ground.is_solid() && !ground.is_ignorable() && world.block(pos + IVec3::Y).is_solid() {
                        *underground.entry(ground).or_default() += 1;
                    }
                }
            }
        }

        // First exposed solid block per column, scanning up from the base if
        // the column is buried at the template's top, else down
        let mut surface: BTreeMap<Material, u32> = BTreeMap::new();
        for x in 0..size.x {
            for z in 0..size.z {
                let column = base + IVec3::new(x, 0, z);
                let scan_up = world.block(column + IVec3::new(0, size.y, 0)).is_solid();
                for i in 0..SURFACE_SAMPLE_DEPTH {
                    let pos = column + IVec3::new(0, if scan_up { i } else { -i }, 0);
                    let ground = world.block(pos);
                    if ground.is_solid() && !world.block(pos + IVec3::Y).is_solid() {
                        *surface.entry(ground).or_default() += 1;
                        break;
                    }
                }
            }
        }

        Self {
            surface: WeightedTable::new(surface.into_iter().map(|(m, n)| (m, n as f64))),
            underground: WeightedTable::new(underground.into_iter().map(|(m, n)| (m, n as f64))),
            fallback,
        }
    }

    pub fn fallback(&self) -> Material {
        self.fallback
    }

    pub fn surface_pool(&self) -> &WeightedTable<Material> {
        &self.surface
    }

    pub fn underground_pool(&self) -> &WeightedTable<Material> {
        &self.underground
    }

    /// Draw a pedestal material. An empty pool yields the fallback.
    pub fn pick(&self, surface: bool, rng: &mut dyn RngCore) -> Material {
        let pool = if surface { &self.surface } else { &self.underground };
        pool.pick_or(self.fallback, rng)
    }
}

/// Turn a template into ordered block writes for a placement at `location`.
///
/// Cells are visited x, then y, then z. Barriers are skipped, stateful
/// blocks become complex writes and bedrock over open ground becomes
/// pedestal material.
pub fn decompose(
    world: &dyn VoxelWorld,
    template: &Template,
    location: &Location,
    palette: &PedestalPalette,
    rng: &mut dyn RngCore,
) -> Vec<SubWrite> {
    let base = template.lowest_corner(location);
    let size = template.size().max(IVec3::ZERO);
    let mut writes = Vec::with_capacity((size.x * size.y * size.z) as usize);

    for (local, block) in template.cells() {
        let material = block.material;
        if material == Material::Barrier {
            continue;
        }
        let pos = base + local;

        if material.requires_complex_write() {
            writes.push(SubWrite::Complex {
                pos,
                block: block.clone(),
            });
        } else if material == Material::Bedrock && !world.block(pos).is_solid() {
            let surface = !template.material(local + IVec3::Y).is_solid();
            writes.push(SubWrite::Direct {
                pos,
                material: palette.pick(surface, rng),
            });
        } else {
            writes.push(SubWrite::Direct { pos, material });
        }
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{ChunkCoord, GridWorld, WorldId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hill() -> GridWorld {
        let mut world = GridWorld::overworld(0);
        world.load_chunk(ChunkCoord::new(0, 0));
        world.fill(IVec3::new(0, 50, 0), IVec3::new(15, 60, 15), Material::Stone);
        world.fill(IVec3::new(0, 61, 0), IVec3::new(15, 63, 15), Material::Dirt);
        world.fill(IVec3::new(0, 64, 0), IVec3::new(15, 64, 15), Material::GrassBlock);
        world
    }

    fn at(y: i32) -> Location {
        Location::new(WorldId(0), 4.0, y, 4.0)
    }

    #[test]
    fn test_order_and_kinds() {
        let world = hill();
        let t = Template::from_fn("shrine", IVec3::new(2, 2, 1), IVec3::ZERO, |p| match (p.x, p.y) {
            (0, 0) => BlockState::new(Material::Cobblestone),
            (1, 0) => BlockState::with_state(Material::Chest, "facing=west"),
            (0, 1) => BlockState::new(Material::Barrier),
            _ => BlockState::new(Material::Torch),
        })
        .unwrap();
        let palette = PedestalPalette::fallback_only(Material::Stone);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let writes = decompose(&world, &t, &at(70), &palette, &mut rng);
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0], SubWrite::Direct { pos: IVec3::new(4, 70, 4), material: Material::Cobblestone });
        assert!(writes[1].is_complex());
        assert_eq!(writes[1].pos(), IVec3::new(5, 70, 4));
        assert_eq!(writes[2].material(), Material::Torch);
    }

    #[test]
    fn test_bedrock_becomes_pedestal_over_air() {
        let world = hill();
        let t = Template::solid("plinth", IVec3::new(1, 2, 1), IVec3::ZERO, Material::Bedrock).unwrap();
        let palette = PedestalPalette::fallback_only(Material::Deepslate);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // Bottom cell lands in grass (solid) and stays bedrock, top cell is in the air
        let writes = decompose(&world, &t, &at(64), &palette, &mut rng);
        assert_eq!(writes[0].material(), Material::Bedrock);
        assert_eq!(writes[1].material(), Material::Deepslate);
    }

    #[test]
    fn test_palette_samples_terrain() {
        let world = hill();
        let t = Template::solid("hut", IVec3::new(3, 3, 3), IVec3::new(1, 1, 1), Material::OakPlanks).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        // Lowest corner at y = 63: dirt under grass, then grass, then air
        let buried = PedestalPalette::sample(&world, &t, &at(64), StructureVariant::Surface);
        assert_eq!(buried.underground_pool().len(), 1);
        assert_eq!(buried.underground_pool().total_weight(), 9.0);
        assert_eq!(buried.pick(false, &mut rng), Material::Dirt);
        // Scanning down from a covered base never finds an exposed block
        assert!(buried.surface_pool().is_empty());
        assert_eq!(buried.pick(true, &mut rng), Material::Stone);

        // Lowest corner on the grass layer
        let resting = PedestalPalette::sample(&world, &t, &at(65), StructureVariant::Surface);
        assert!(resting.underground_pool().is_empty());
        assert_eq!(resting.surface_pool().total_weight(), 9.0);
        assert_eq!(resting.pick(true, &mut rng), Material::GrassBlock);
        assert_eq!(resting.fallback(), Material::Stone);
    }

    #[test]
    fn test_sky_palette_uses_fallback() {
        let world = hill();
        let t = Template::solid("cloud", IVec3::new(3, 3, 3), IVec3::new(1, 1, 1), Material::Glass)
            .unwrap()
            .with_pedestal(Material::Cobblestone);
        let palette = PedestalPalette::sample(&world, &t, &at(64), StructureVariant::Sky);
        assert!(palette.surface_pool().is_empty());
        assert!(palette.underground_pool().is_empty());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(palette.pick(true, &mut rng), Material::Cobblestone);
    }

    #[test]
    fn test_empty_pools_fall_back_by_environment() {
        let world = GridWorld::nether(0);
        let t = Template::solid("cage", IVec3::ONE, IVec3::ZERO, Material::Glass).unwrap();
        let palette = PedestalPalette::sample(&world, &t, &at(64), StructureVariant::Surface);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(palette.pick(false, &mut rng), Material::Netherrack);
    }
}
