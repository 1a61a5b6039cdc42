//! World access trait and an in-memory column world

use super::chunk::{ChunkCoord, CHUNK_SIZE};
use super::location::WorldId;
use super::material::{BlockState, Material};
use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// World kind. Overworld and Custom behave identically everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Overworld,
    Custom,
    Nether,
    End,
}

impl Environment {
    /// Overworld or Custom
    pub fn is_overworld_like(self) -> bool {
        matches!(self, Environment::Overworld | Environment::Custom)
    }

    /// Fallback pedestal material when the surrounding terrain gives no sample
    pub fn default_pedestal(self) -> Material {
        match self {
            Environment::Nether => Material::Netherrack,
            Environment::End => Material::EndStone,
            Environment::Overworld | Environment::Custom => Material::Stone,
        }
    }
}

/// Read/write access to a chunked voxel world.
///
/// All placement logic goes through this trait. Positions outside loaded
/// chunks or outside `[min_height, max_height)` must read as
/// [`Material::VoidAir`].
pub trait VoxelWorld {
    fn id(&self) -> WorldId;

    /// Human-readable world name
    fn name(&self) -> &str;

    fn seed(&self) -> i64;

    fn environment(&self) -> Environment;

    /// Lowest valid block height (inclusive)
    fn min_height(&self) -> i32;

    /// Highest valid block height (exclusive)
    fn max_height(&self) -> i32;

    /// Material at a block position
    fn block(&self, pos: IVec3) -> Material;

    /// Replace the material at a block position, dropping any block state
    fn set_block(&mut self, pos: IVec3, material: Material);

    /// Height of the topmost non-air block in a column, `None` if the column
    /// is unloaded or empty
    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32>;

    /// Write a block that carries state (containers, stairs, signs...)
    fn write_complex(&mut self, pos: IVec3, block: &BlockState) -> Result<()> {
        self.set_block(pos, block.material);
        Ok(())
    }
}

/// One loaded 16 x 16 column tile
struct ColumnChunk {
    blocks: Vec<Material>,
}

impl ColumnChunk {
    fn filled(height: usize, material: Material) -> Self {
        Self {
            blocks: vec![material; CHUNK_SIZE as usize * CHUNK_SIZE as usize * height],
        }
    }
}

/// In-memory world backed by a map of column chunks.
///
/// Used by the demo binary, the benchmarks and the test suite. Writes into
/// an unloaded chunk load it as air first.
pub struct GridWorld {
    id: WorldId,
    name: String,
    seed: i64,
    environment: Environment,
    min_height: i32,
    max_height: i32,
    chunks: HashMap<ChunkCoord, ColumnChunk>,
    /// Block state strings written through the complex path
    states: HashMap<IVec3, String>,
    /// Positions that refuse complex writes
    locked: HashSet<IVec3>,
    /// Chunks touched by writes since the last `take_modified`
    modified_chunks: HashSet<ChunkCoord>,
}

impl GridWorld {
    /// Create a new empty world
    pub fn new(id: WorldId, seed: i64, environment: Environment, min_height: i32, max_height: i32) -> Self {
        Self {
            id,
            name: format!("world_{}", id.0),
            seed,
            environment,
            min_height,
            max_height: max_height.max(min_height + 1),
            chunks: HashMap::new(),
            states: HashMap::new(),
            locked: HashSet::new(),
            modified_chunks: HashSet::new(),
        }
    }

    /// Overworld-shaped world with heights `[-64, 320)`
    pub fn overworld(seed: i64) -> Self {
        Self::new(WorldId(0), seed, Environment::Overworld, -64, 320)
    }

    /// Nether-shaped world with heights `[0, 256)`
    pub fn nether(seed: i64) -> Self {
        Self::new(WorldId(1), seed, Environment::Nether, 0, 256)
    }

    /// End-shaped world with heights `[0, 256)`
    pub fn end(seed: i64) -> Self {
        Self::new(WorldId(2), seed, Environment::End, 0, 256)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn height(&self) -> usize {
        (self.max_height - self.min_height) as usize
    }

    fn index(&self, pos: IVec3) -> Option<(ChunkCoord, usize)> {
        if pos.y < self.min_height || pos.y >= self.max_height {
            return None;
        }
        let coord = ChunkCoord::from_block_pos(pos);
        let lx = pos.x.rem_euclid(CHUNK_SIZE) as usize;
        let lz = pos.z.rem_euclid(CHUNK_SIZE) as usize;
        let ly = (pos.y - self.min_height) as usize;
        Some((coord, (ly * CHUNK_SIZE as usize + lz) * CHUNK_SIZE as usize + lx))
    }

    // --- Chunk management ---

    /// Load a chunk filled with air. Existing chunks are left untouched.
    pub fn load_chunk(&mut self, coord: ChunkCoord) {
        let height = self.height();
        self.chunks
            .entry(coord)
            .or_insert_with(|| ColumnChunk::filled(height, Material::Air));
    }

    /// Load every chunk in the inclusive square `[min, max]`
    pub fn load_area(&mut self, min: ChunkCoord, max: ChunkCoord) {
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                self.load_chunk(ChunkCoord::new(x, z));
            }
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    // --- Bulk edits ---

    /// Fill a whole column between `y_min` and `y_max` (inclusive)
    pub fn fill_column(&mut self, x: i32, z: i32, y_min: i32, y_max: i32, material: Material) {
        for y in y_min..=y_max {
            self.set_block(IVec3::new(x, y, z), material);
        }
    }

    /// Fill an inclusive box of blocks
    pub fn fill(&mut self, min: IVec3, max: IVec3, material: Material) {
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                self.fill_column(x, z, min.y, max.y, material);
            }
        }
    }

    /// Block state string written through the complex path, if any
    pub fn state_at(&self, pos: IVec3) -> Option<&str> {
        self.states.get(&pos).map(String::as_str)
    }

    /// Make complex writes at `pos` fail, as a protected block would
    pub fn lock_block(&mut self, pos: IVec3) {
        self.locked.insert(pos);
    }

    /// Mark a chunk as modified
    pub fn mark_modified(&mut self, coord: ChunkCoord) {
        self.modified_chunks.insert(coord);
    }

    /// Take the list of modified chunks and clear the internal list
    pub fn take_modified(&mut self) -> Vec<ChunkCoord> {
        self.modified_chunks.drain().collect()
    }
}

impl VoxelWorld for GridWorld {
    fn id(&self) -> WorldId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn seed(&self) -> i64 {
        self.seed
    }

    fn environment(&self) -> Environment {
        self.environment
    }

    fn min_height(&self) -> i32 {
        self.min_height
    }

    fn max_height(&self) -> i32 {
        self.max_height
    }

    fn block(&self, pos: IVec3) -> Material {
        self.index(pos)
            .and_then(|(coord, idx)| self.chunks.get(&coord).map(|c| c.blocks[idx]))
            .unwrap_or(Material::VoidAir)
    }

    fn set_block(&mut self, pos: IVec3, material: Material) {
        let Some((coord, idx)) = self.index(pos) else {
            return;
        };
        self.load_chunk(coord);
        if let Some(chunk) = self.chunks.get_mut(&coord) {
            chunk.blocks[idx] = material;
        }
        self.states.remove(&pos);
        self.mark_modified(coord);
    }

    fn highest_block_y(&self, x: i32, z: i32) -> Option<i32> {
        let coord = ChunkCoord::from_block(x, z);
        if !self.chunks.contains_key(&coord) {
            return None;
        }
        (self.min_height..self.max_height)
            .rev()
            .find(|&y| !self.block(IVec3::new(x, y, z)).is_air())
    }

    fn write_complex(&mut self, pos: IVec3, block: &BlockState) -> Result<()> {
        if self.locked.contains(&pos) {
            return Err(Error::BlockWrite {
                pos,
                message: "block is locked".to_string(),
            });
        }
        if self.index(pos).is_none() {
            return Err(Error::BlockWrite {
                pos,
                message: "outside world height".to_string(),
            });
        }
        self.set_block(pos, block.material);
        if let Some(state) = &block.state {
            self.states.insert(pos, state.clone());
        }
        Ok(())
    }
}
