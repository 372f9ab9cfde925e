//! A single square chunk of blocks with bounds-checked access, dirty flags,
//! and versioning.
//!
//! [`Chunk`] stores one [`BlockType`] and one [`BlockState`] per cell in flat
//! row-major arrays (`x` fastest). Local coordinates are `i32` so that
//! unresolved neighbor offsets can be passed straight through and rejected:
//! out-of-range access is a caller bug and returns
//! [`ChunkError::OutOfBounds`] instead of being clamped.

use sandgrid_blocks::{BlockCatalog, BlockState, BlockType};
use sandgrid_coords::{ChunkCoord, ChunkSize, LocalCoord};

use crate::error::ChunkError;
use crate::occupancy::OccupancyGrid;

/// Dirty-flag bit: solid occupancy changed, colliders need rebuilding.
pub const COLLISION_DIRTY: u8 = 0b0000_0001;
/// Dirty-flag bit: chunk contents changed since the last save.
pub const SAVE_DIRTY: u8 = 0b0000_0010;

const ALL_DIRTY: u8 = COLLISION_DIRTY | SAVE_DIRTY;

/// A `size × size` block of the world.
///
/// Created only by [`ChunkStore`](crate::ChunkStore). The coordinate and size
/// never change; after [`dispose`](Self::dispose) the storage is released and
/// every access fails with [`ChunkError::Disposed`].
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    size: ChunkSize,
    /// Store-assigned, unique per created chunk.
    generation: u64,
    blocks: Vec<BlockType>,
    states: Vec<BlockState>,
    /// Bitfield of dirty flags.
    dirty: u8,
    /// Incremented on every mutation.
    version: u64,
    disposed: bool,
}

impl Chunk {
    /// Creates a chunk of Air with every state `None`.
    pub(crate) fn new(coord: ChunkCoord, size: ChunkSize, generation: u64) -> Self {
        Self {
            coord,
            size,
            generation,
            blocks: vec![BlockType::Air; size.area()],
            states: vec![BlockState::None; size.area()],
            dirty: 0,
            version: 0,
            disposed: false,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn size(&self) -> ChunkSize {
        self.size
    }

    /// Distinguishes this chunk from any earlier or later chunk created at the
    /// same coordinate. Stays readable after disposal.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the block at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`ChunkError::OutOfBounds`] if either axis is outside `[0, size)`,
    /// [`ChunkError::Disposed`] after eviction.
    pub fn get(&self, x: i32, y: i32) -> Result<BlockType, ChunkError> {
        let i = self.index(x, y, "get")?;
        Ok(self.blocks[i])
    }

    /// Same as [`get`](Self::get) for a [`LocalCoord`].
    pub fn get_local(&self, local: LocalCoord) -> Result<BlockType, ChunkError> {
        self.get(local.x, local.y)
    }

    /// Writes `block` at `(x, y)` and returns the block it replaced.
    ///
    /// Replacing a block resets the cell's state to `None`, bumps the version,
    /// and marks the chunk save-dirty; it is also marked collision-dirty when
    /// the cell's solidity changes. Writing the block already present is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn set(&mut self, x: i32, y: i32, block: BlockType) -> Result<BlockType, ChunkError> {
        let i = self.index(x, y, "set")?;
        let previous = self.blocks[i];
        if previous == block {
            return Ok(previous);
        }
        self.blocks[i] = block;
        self.states[i] = BlockState::None;
        self.dirty |= SAVE_DIRTY;
        if previous.is_solid() != block.is_solid() {
            self.dirty |= COLLISION_DIRTY;
        }
        self.version += 1;
        Ok(previous)
    }

    /// Same as [`set`](Self::set) for a [`LocalCoord`].
    pub fn set_local(
        &mut self,
        local: LocalCoord,
        block: BlockType,
    ) -> Result<BlockType, ChunkError> {
        self.set(local.x, local.y, block)
    }

    /// Returns the state tag of the block at `(x, y)`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn state(&self, x: i32, y: i32) -> Result<BlockState, ChunkError> {
        let i = self.index(x, y, "state")?;
        Ok(self.states[i])
    }

    /// Tags the block at `(x, y)` with `state`.
    ///
    /// # Errors
    ///
    /// [`ChunkError::InvalidState`] if the catalog says the block cannot carry
    /// `state`, plus the errors of [`get`](Self::get).
    pub fn set_state(
        &mut self,
        x: i32,
        y: i32,
        state: BlockState,
        catalog: &BlockCatalog,
    ) -> Result<(), ChunkError> {
        let i = self.index(x, y, "set_state")?;
        catalog.validate_state(self.blocks[i], state)?;
        if self.states[i] != state {
            self.states[i] = state;
            self.dirty |= SAVE_DIRTY;
            self.version += 1;
        }
        Ok(())
    }

    /// Fills every cell with `block` and clears all states.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] after eviction.
    pub fn fill(&mut self, block: BlockType) -> Result<(), ChunkError> {
        self.check_live()?;
        self.blocks.fill(block);
        self.states.fill(BlockState::None);
        self.dirty |= ALL_DIRTY;
        self.version += 1;
        Ok(())
    }

    /// Snapshot of which cells are solid according to `catalog`.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] after eviction.
    pub fn occupancy_grid(&self, catalog: &BlockCatalog) -> Result<OccupancyGrid, ChunkError> {
        self.check_live()?;
        let size = self.size.as_usize();
        Ok(OccupancyGrid::from_fn(size, |x, y| {
            catalog.is_solid(self.blocks[y * size + x])
        }))
    }

    /// Number of solid cells.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] after eviction.
    pub fn solid_count(&self, catalog: &BlockCatalog) -> Result<usize, ChunkError> {
        self.check_live()?;
        Ok(self.blocks.iter().filter(|&&b| catalog.is_solid(b)).count())
    }

    /// The raw block array, row-major with `x` fastest. Empty once disposed.
    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    /// Returns the current dirty flags.
    pub fn dirty_flags(&self) -> u8 {
        self.dirty
    }

    /// Returns `true` if the specified dirty flag (or combination) is set.
    pub fn is_dirty(&self, flag: u8) -> bool {
        self.dirty & flag == flag
    }

    pub fn mark_dirty(&mut self, flags: u8) {
        self.dirty |= flags;
    }

    /// Clears the specified dirty flag bits.
    pub fn clear_dirty(&mut self, flags: u8) {
        self.dirty &= !flags;
    }

    /// Returns the current version counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases the block storage. Idempotent.
    pub(crate) fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.blocks = Vec::new();
        self.states = Vec::new();
        self.dirty = 0;
        self.disposed = true;
    }

    fn check_live(&self) -> Result<(), ChunkError> {
        if self.disposed {
            Err(ChunkError::Disposed(self.coord))
        } else {
            Ok(())
        }
    }

    /// Flat index of `(x, y)`, or the reason there is none.
    fn index(&self, x: i32, y: i32, op: &'static str) -> Result<usize, ChunkError> {
        self.check_live()?;
        if !self.size.contains(x, y) {
            tracing::warn!(
                chunk = ?self.coord,
                op,
                "Chunk access out of bounds: ({}, {})",
                x,
                y
            );
            return Err(ChunkError::OutOfBounds {
                x,
                y,
                size: self.size.get(),
            });
        }
        // Both axes are in [0, size) here.
        Ok(y as usize * self.size.as_usize() + x as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
