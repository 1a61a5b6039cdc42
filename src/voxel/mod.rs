//! Voxel world model: chunks, materials, locations and world access

pub mod chunk;
pub mod location;
pub mod material;
pub mod world;

pub use chunk::{ChunkCoord, CHUNK_SIZE};
pub use location::{Location, WorldId};
pub use material::{BlockState, Material};
pub use world::{Environment, GridWorld, VoxelWorld};
