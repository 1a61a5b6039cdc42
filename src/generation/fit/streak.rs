//! Vertical streak probes.
//!
//! Nether and End columns have no single top surface, so sky and underground
//! placements look for a long run of air or solid blocks instead. A run may
//! swallow a few interrupting blocks (the tolerance) before it ends; void or
//! bedrock end it immediately.

use rand::{Rng, RngCore};

use crate::core::types::IVec3;
use crate::voxel::{Material, VoxelWorld};

/// Interrupting blocks a streak may absorb before it ends
pub const STREAK_TOLERANCE: u32 = 3;

/// Shortest usable streak
pub const MIN_STREAK_SPAN: i32 = 20;

/// Streaks longer than this get a random height instead of the bottom
pub const RANDOMIZE_ABOVE_SPAN: i32 = 30;

/// Air streak length that ends the sky probe early
const AIR_STREAK_STOP: i32 = 40;

/// Solid streak length that ends the underground probe early
const SOLID_STREAK_STOP: i32 = 20;

/// Inclusive bounds of a detected streak
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Streak {
    pub low: i32,
    pub high: i32,
}

impl Streak {
    pub fn span(&self) -> i32 {
        self.high - self.low
    }

    /// Placement height inside the streak.
    ///
    /// Streaks shorter than 20 blocks are rejected. Streaks longer than 30
    /// get a random height in `[low + 1, high - 20)`, the rest sit at
    /// `low + 1`.
    pub fn placement_y(&self, rng: &mut dyn RngCore) -> Option<i32> {
        let span = self.span();
        if span < MIN_STREAK_SPAN {
            return None;
        }
        if span > RANDOMIZE_ABOVE_SPAN {
            Some(rng.gen_range(self.low + 1..self.high - MIN_STREAK_SPAN))
        } else {
            Some(self.low + 1)
        }
    }
}

#[inline]
fn is_hard_stop(material: Material) -> bool {
    matches!(material, Material::VoidAir | Material::Bedrock)
}

/// Scan `[from, to)` upward for an air streak.
///
/// Returns `None` on any unloaded block, or when a streak is cut by bedrock
/// before it reaches 40 blocks. The caller still applies the minimum span through
/// [`Streak::placement_y`].
pub fn air_streak(world: &dyn VoxelWorld, x: i32, z: i32, from: i32, to: i32) -> Option<Streak> {
    let (mut low, mut high) = (0, 0);
    let mut in_streak = false;
    let mut tolerance = STREAK_TOLERANCE;

    for y in from..to {
        let material = world.block(IVec3::new(x, y, z));
        if material == Material::VoidAir {
            return None;
        }
        if material.is_air() {
            if in_streak {
                high = y;
            } else {
                low = y;
                high = y;
                in_streak = true;
            }
        } else if is_hard_stop(material) || tolerance == 0 {
            if in_streak {
                in_streak = false;
                if high - low >= AIR_STREAK_STOP {
                    break;
                }
                if is_hard_stop(material) {
                    return None;
                }
                tolerance = STREAK_TOLERANCE;
            }
        } else if in_streak {
            tolerance -= 1;
            high = y;
        }
    }

    Some(Streak { low, high })
}

/// Scan for a solid streak between `lowest` and `highest`.
///
/// Ascending probes start at `lowest` and walk up to `highest`; descending
/// probes start at `highest` and walk down to `lowest`. Both bounds are
/// exclusive of the far end.
pub fn solid_streak(world: &dyn VoxelWorld, x: i32, z: i32, lowest: i32, highest: i32, descending: bool) -> Option<Streak> {
    let (step, mut y) = if descending { (-1, highest) } else { (1, lowest) };
    // `near` is where the streak was entered, `far` how far it has grown
    let (mut near, mut far) = (0, 0);
    let mut in_streak = false;
    let mut tolerance = STREAK_TOLERANCE;

    while if descending { y > lowest } else { y < highest } {
        let material = world.block(IVec3::new(x, y, z));
        if material.is_solid() {
            if !in_streak {
                in_streak = true;
                near = y;
            }
            far = y;
        } else if in_streak {
            if is_hard_stop(material) || tolerance == 0 {
                in_streak = false;
                if (far - near).abs() >= SOLID_STREAK_STOP {
                    break;
                }
                if is_hard_stop(material) {
                    return None;
                }
                tolerance = STREAK_TOLERANCE;
            } else {
                tolerance -= 1;
                far = y;
            }
        }
        y += step;
    }

    Some(Streak {
        low: near.min(far),
        high: near.max(far),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{ChunkCoord, GridWorld};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn column(solid: &[(i32, i32, Material)]) -> GridWorld {
        let mut world = GridWorld::nether(0);
        world.load_chunk(ChunkCoord::new(0, 0));
        for &(lo, hi, m) in solid {
            world.fill_column(0, 0, lo, hi, m);
        }
        world
    }

    #[test]
    fn test_placement_y_rules() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(Streak { low: 10, high: 29 }.placement_y(&mut rng), None);
        assert_eq!(Streak { low: 10, high: 30 }.placement_y(&mut rng), Some(11));
        assert_eq!(Streak { low: 10, high: 40 }.placement_y(&mut rng), Some(11));
        for _ in 0..100 {
            let y = Streak { low: 10, high: 60 }.placement_y(&mut rng).unwrap();
            assert!((11..40).contains(&y));
        }
    }

    #[test]
    fn test_air_streak_between_floor_and_ceiling() {
        let world = column(&[(0, 49, Material::Netherrack), (80, 127, Material::Netherrack)]);
        let streak = air_streak(&world, 0, 0, 45, 100).unwrap();
        // Tolerance lets the streak run three blocks into the ceiling
        assert_eq!(streak, Streak { low: 50, high: 82 });
    }

    #[test]
    fn test_air_streak_long_run_stops_early() {
        let world = column(&[(0, 44, Material::Netherrack), (96, 127, Material::Netherrack)]);
        let streak = air_streak(&world, 0, 0, 45, 100).unwrap();
        assert_eq!(streak.low, 45);
        assert_eq!(streak.high, 98);
    }

    #[test]
    fn test_air_streak_cut_by_bedrock() {
        let world = column(&[(0, 49, Material::Netherrack), (60, 60, Material::Bedrock)]);
        assert_eq!(air_streak(&world, 0, 0, 45, 100), None);
    }

    #[test]
    fn test_air_streak_unloaded_column() {
        let world = GridWorld::nether(0);
        assert_eq!(air_streak(&world, 0, 0, 45, 100), None);

        // Loaded neighbour chunk does not help an unloaded column
        let loaded = column(&[(0, 49, Material::Netherrack)]);
        assert_eq!(air_streak(&loaded, 40, 0, 45, 100), None);
    }

    #[test]
    fn test_solid_streak_ascending() {
        let world = column(&[(10, 30, Material::Netherrack)]);
        let streak = solid_streak(&world, 0, 0, 5, 100, false).unwrap();
        // Three tolerated air blocks extend the top
        assert_eq!(streak, Streak { low: 10, high: 33 });
    }

    #[test]
    fn test_solid_streak_descending() {
        let world = column(&[(10, 50, Material::Netherrack)]);
        let streak = solid_streak(&world, 0, 0, 5, 60, true).unwrap();
        assert_eq!(streak.high, 50);
        assert!(streak.span() >= 20);
    }

    #[test]
    fn test_solid_streak_cut_by_void() {
        // Short streak running off the top of a 256-high world
        let world = column(&[(250, 255, Material::Netherrack)]);
        assert_eq!(solid_streak(&world, 0, 0, 240, 300, false), None);
    }
}
