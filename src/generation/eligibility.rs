//! Deterministic chunk eligibility.
//!
//! The plane is tiled into square cells of `grid_distance` chunks, with odd
//! rows shifted by half a cell. Each cell owns exactly one anchor chunk: its
//! base corner plus a jitter drawn from a generator seeded by the world seed,
//! the variant and the cell position. A chunk is eligible when it is the
//! anchor of one of the nine cells around it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::variant::StructureVariant;
use crate::voxel::ChunkCoord;

/// Seed mixed with the variant salt
#[inline]
fn variant_seed(seed: i64, variant: StructureVariant) -> i64 {
    seed ^ variant.salt()
}

/// Anchor chunk of the grid cell `(grid_x, grid_z)`
fn cell_anchor(seed: i64, grid_x: i32, grid_z: i32, grid_distance: i32, max_offset: i32) -> ChunkCoord {
    let mut base_x = grid_x.wrapping_mul(grid_distance);
    let base_z = grid_z.wrapping_mul(grid_distance);
    if grid_z & 1 == 1 {
        base_x = base_x.wrapping_add(grid_distance / 2);
    }

    let combined = seed ^ (((base_x as i64) << 32) ^ (base_z as i64 & 0xFFFF_FFFF));
    let mut rng = ChaCha8Rng::seed_from_u64(combined as u64);

    let max_offset = max_offset.max(0);
    let (jx, jz) = if max_offset > 0 {
        let jx = rng.gen_range(-max_offset..=max_offset);
        let jz = rng.gen_range(-max_offset..=max_offset);
        (jx, jz)
    } else {
        (0, 0)
    };

    ChunkCoord::new(base_x.wrapping_add(jx), base_z.wrapping_add(jz))
}

/// Whether `chunk` anchors a structure of `variant`.
///
/// Pure in all of its inputs. A non-positive `grid_distance` is never eligible.
///
/// # Arguments
/// * `seed` - World seed
/// * `variant` - Structure variant being considered
/// * `chunk` - Chunk being loaded
/// * `grid_distance` - Grid cell side, in chunks
/// * `max_offset` - Maximum jitter from the cell base, in chunks
pub fn is_eligible(seed: i64, variant: StructureVariant, chunk: ChunkCoord, grid_distance: i32, max_offset: i32) -> bool {
    if grid_distance <= 0 {
        return false;
    }

    let seed = variant_seed(seed, variant);
    let grid_x = chunk.x.div_euclid(grid_distance);
    let grid_z = chunk.z.div_euclid(grid_distance);

    for dx in -1..=1 {
        for dz in -1..=1 {
            if cell_anchor(seed, grid_x + dx, grid_z + dz, grid_distance, max_offset) == chunk {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pure() {
        let variant = StructureVariant::Surface;
        for x in -40..40 {
            for z in -40..40 {
                let chunk = ChunkCoord::new(x, z);
                let first = is_eligible(1234, variant, chunk, 31, 8);
                assert_eq!(first, is_eligible(1234, variant, chunk, 31, 8));
            }
        }
    }

    #[test]
    fn test_zero_offset_hits_cell_bases() {
        let v = StructureVariant::UndergroundDeep;
        assert!(is_eligible(0, v, ChunkCoord::new(0, 0), 10, 0));
        assert!(is_eligible(0, v, ChunkCoord::new(10, 0), 10, 0));
        assert!(is_eligible(0, v, ChunkCoord::new(-10, -20), 10, 0));
        // Odd rows are shifted by half a cell
        assert!(is_eligible(0, v, ChunkCoord::new(5, 10), 10, 0));
        assert!(!is_eligible(0, v, ChunkCoord::new(0, 10), 10, 0));
        assert!(!is_eligible(0, v, ChunkCoord::new(3, 3), 10, 0));
    }

    #[test]
    fn test_non_positive_grid_never_eligible() {
        let chunk = ChunkCoord::new(0, 0);
        assert!(!is_eligible(9, StructureVariant::Sky, chunk, 0, 0));
        assert!(!is_eligible(9, StructureVariant::Sky, chunk, -5, 2));
    }

    #[test]
    fn test_roughly_one_anchor_per_cell() {
        let mut count = 0;
        for x in 0..200 {
            for z in 0..200 {
                if is_eligible(42, StructureVariant::Surface, ChunkCoord::new(x, z), 20, 5) {
                    count += 1;
                }
            }
        }
        // 100 cells in the area, edge cells may jitter in or out
        assert!((70..=130).contains(&count), "count was {}", count);
    }

    #[test]
    fn test_variants_and_seeds_differ() {
        let anchors = |seed: i64, variant: StructureVariant| -> Vec<ChunkCoord> {
            let mut out = Vec::new();
            for x in 0..60 {
                for z in 0..60 {
                    let c = ChunkCoord::new(x, z);
                    if is_eligible(seed, variant, c, 15, 6) {
                        out.push(c);
                    }
                }
            }
            out
        };
        let base = anchors(7, StructureVariant::Surface);
        assert_ne!(base, anchors(7, StructureVariant::UndergroundShallow));
        assert_ne!(base, anchors(8, StructureVariant::Surface));
    }
}
