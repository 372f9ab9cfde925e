//! Chunk storage for the sandgrid world: bounds-checked chunks, occupancy
//! snapshots, and the concurrent chunk store.

pub mod chunk;
pub mod error;
pub mod occupancy;
pub mod store;

pub use chunk::{COLLISION_DIRTY, Chunk, SAVE_DIRTY};
pub use error::ChunkError;
pub use occupancy::OccupancyGrid;
pub use store::{ChunkHandle, ChunkStore};
