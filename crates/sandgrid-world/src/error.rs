//! Chunk access errors.

use sandgrid_blocks::CatalogError;
use sandgrid_coords::ChunkCoord;

/// Contract violations on chunk access. None of these are clamped or wrapped:
/// an out-of-range local coordinate means the caller skipped resolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChunkError {
    /// A local coordinate outside `[0, size)` on either axis.
    #[error("local coordinate ({x}, {y}) out of bounds for chunk size {size}")]
    OutOfBounds { x: i32, y: i32, size: i32 },

    /// The chunk was evicted and its storage released.
    #[error("chunk {0:?} has been disposed")]
    Disposed(ChunkCoord),

    /// A block state the block type cannot carry.
    #[error(transparent)]
    InvalidState(#[from] CatalogError),
}
