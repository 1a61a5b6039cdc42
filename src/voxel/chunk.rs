//! Chunk grid addressing for column-based worlds

use crate::core::types::IVec3;

/// Width of a chunk along x and z, in blocks
pub const CHUNK_SIZE: i32 = 16;

/// Integer coordinate identifying a 16x16 column tile in the world grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    /// Create a new chunk coordinate
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the given block column
    pub fn from_block(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE),
            z: z.div_euclid(CHUNK_SIZE),
        }
    }

    /// Chunk containing a block position (y is ignored)
    pub fn from_block_pos(pos: IVec3) -> Self {
        Self::from_block(pos.x, pos.z)
    }

    /// Minimum block corner of this chunk at the given height
    pub fn world_origin(&self, y: i32) -> IVec3 {
        IVec3::new(self.x * CHUNK_SIZE, y, self.z * CHUNK_SIZE)
    }

    /// Center block column `(x * 16 + 8, z * 16 + 8)`
    pub fn center_block(&self) -> (i32, i32) {
        (self.x * CHUNK_SIZE + CHUNK_SIZE / 2, self.z * CHUNK_SIZE + CHUNK_SIZE / 2)
    }

    /// Block inside this chunk at local column `(lx, lz)` and height `y`
    pub fn block_at(&self, lx: i32, y: i32, lz: i32) -> IVec3 {
        self.world_origin(y) + IVec3::new(lx, 0, lz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_new() {
        let coord = ChunkCoord::new(1, -3);
        assert_eq!(coord.x, 1);
        assert_eq!(coord.z, -3);
    }

    #[test]
    fn test_from_block() {
        assert_eq!(ChunkCoord::from_block(0, 0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block(15, 16), ChunkCoord::new(0, 1));

        // Negative coordinates floor rather than truncate
        assert_eq!(ChunkCoord::from_block(-1, -16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block(-17, 5), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_center_and_origin() {
        let coord = ChunkCoord::new(2, -1);
        assert_eq!(coord.center_block(), (40, -8));
        assert_eq!(coord.world_origin(64), IVec3::new(32, 64, -16));
        assert_eq!(coord.block_at(8, 0, 8), IVec3::new(40, 0, -8));
    }

    #[test]
    fn test_center_round_trip() {
        let original = ChunkCoord::new(-5, 10);
        let (cx, cz) = original.center_block();
        assert_eq!(ChunkCoord::from_block(cx, cz), original);
    }
}
