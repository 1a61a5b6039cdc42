//! World locations

use crate::core::types::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque world identity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorldId(pub u32);

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

/// A position in a specific world. x/z may be fractional, y is a block height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: i32,
    pub z: f64,
}

impl Location {
    pub fn new(world: WorldId, x: f64, y: i32, z: f64) -> Self {
        Self { world, x, y, z }
    }

    /// Block containing this location (x/z floored)
    pub fn block_pos(&self) -> IVec3 {
        IVec3::new(self.x.floor() as i32, self.y, self.z.floor() as i32)
    }


    /// Location shifted horizontally
    pub fn offset_xz(&self, dx: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            z: self.z + dz,
            ..*self
        }
    }

    /// Same column at a different height
    pub fn with_y(&self, y: i32) -> Self {
        Self { y, ..*self }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.block_pos();
        write!(f, "{} {} {} {}", self.world, b.x, b.y, b.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_pos_floors() {
        let loc = Location::new(WorldId(1), -0.5, 64, 8.9);
        assert_eq!(loc.block_pos(), IVec3::new(-1, 64, 8));
    }

    #[test]
    fn test_offsets_are_values() {
        let base = Location::new(WorldId(0), 8.0, 70, 8.0);
        let moved = base.offset_xz(-2.0, 3.0).with_y(71);
        assert_eq!(moved.block_pos(), IVec3::new(6, 71, 11));
        assert_eq!(base.block_pos(), IVec3::new(8, 70, 8));
        assert_eq!(base.offset_xz(16.0, -32.0).block_pos(), IVec3::new(24, 70, -24));
        assert_eq!(base.with_y(5).y, 5);
    }
}
