//! Sole owner of all loaded chunks, keyed by [`ChunkCoord`].
//!
//! [`ChunkStore`] creates chunks lazily on first access and hands out shared
//! [`ChunkHandle`]s. Creation is an atomic insert-if-absent on a sharded
//! [`DashMap`], so concurrent callers asking for the same coordinate always
//! observe the same instance. Each chunk sits behind its own
//! [`RwLock`](parking_lot::RwLock); independent chunks can be simulated in
//! parallel, and callers that touch several chunks at once must take their
//! locks in ascending [`ChunkCoord`] order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use sandgrid_blocks::BlockType;
use sandgrid_coords::{ChunkCoord, ChunkSize, GlobalCoord, Resolved, resolve};

use crate::chunk::{COLLISION_DIRTY, Chunk};
use crate::error::ChunkError;

/// Shared, lockable reference to a loaded chunk.
///
/// A handle stays valid after eviction, but the chunk behind it is disposed
/// and rejects every operation with [`ChunkError::Disposed`].
pub type ChunkHandle = Arc<RwLock<Chunk>>;

/// Owns every loaded chunk and provides lookup by [`ChunkCoord`].
pub struct ChunkStore {
    size: ChunkSize,
    chunks: DashMap<ChunkCoord, ChunkHandle, FxBuildHasher>,
    /// Next [`Chunk::generation`] to hand out.
    next_generation: AtomicU64,
}

impl ChunkStore {
    /// Creates an empty store whose chunks are all `size × size`.
    pub fn new(size: ChunkSize) -> Self {
        Self {
            size,
            chunks: DashMap::with_hasher(FxBuildHasher),
            next_generation: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> ChunkSize {
        self.size
    }

    /// Returns the chunk at `coord`, creating an all-Air chunk if none is
    /// loaded. At most one chunk ever exists per coordinate.
    pub fn chunk_at(&self, coord: ChunkCoord) -> ChunkHandle {
        if let Some(existing) = self.chunks.get(&coord) {
            return Arc::clone(existing.value());
        }
        let entry = self.chunks.entry(coord).or_insert_with(|| {
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?coord, generation, "Creating chunk");
            Arc::new(RwLock::new(Chunk::new(coord, self.size, generation)))
        });
        Arc::clone(entry.value())
    }

    /// Returns the chunk at `coord` if it is loaded. Never creates one.
    pub fn try_get_chunk(&self, coord: ChunkCoord) -> Option<ChunkHandle> {
        self.chunks.get(&coord).map(|c| Arc::clone(c.value()))
    }

    /// Removes and disposes the chunk at `coord`.
    ///
    /// Returns `false` if no chunk was loaded there.
    pub fn evict(&self, coord: ChunkCoord) -> bool {
        let Some((_, handle)) = self.chunks.remove(&coord) else {
            return false;
        };
        handle.write().dispose();
        tracing::debug!(?coord, "Evicted chunk");
        true
    }

    /// Number of currently loaded chunks.
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// All loaded chunk coordinates in ascending order.
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.iter().map(|e| *e.key()).collect();
        coords.sort_unstable();
        coords
    }

    /// Coordinates of chunks with the given dirty flag set, ascending.
    pub fn dirty_coords(&self, flag: u8) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self
            .chunks
            .iter()
            .filter(|e| e.value().read().is_dirty(flag))
            .map(|e| *e.key())
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Coordinates of chunks whose colliders are out of date, ascending.
    pub fn collision_dirty_coords(&self) -> Vec<ChunkCoord> {
        self.dirty_coords(COLLISION_DIRTY)
    }

    // -----------------------------------------------------------------------
    // Global-coordinate access
    // -----------------------------------------------------------------------

    /// The block at a world position, or `None` if its chunk is not loaded.
    pub fn block_at(&self, global: GlobalCoord) -> Option<BlockType> {
        let (coord, local) = global.decompose(self.size);
        let handle = self.try_get_chunk(coord)?;
        handle.read().get_local(local).ok()
    }

    /// Writes a block at a world position, loading its chunk if needed.
    /// Returns the block it replaced.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] if the chunk was evicted concurrently.
    pub fn set_block(
        &self,
        global: GlobalCoord,
        block: BlockType,
    ) -> Result<BlockType, ChunkError> {
        let (coord, local) = global.decompose(self.size);
        self.chunk_at(coord).write().set_local(local, block)
    }

    /// Resolves `(local_x, local_y)` relative to `origin` to its owning chunk.
    #[inline]
    pub fn resolve(&self, origin: ChunkCoord, local_x: i32, local_y: i32) -> Resolved {
        resolve(local_x, local_y, origin, self.size)
    }

    /// The block at a possibly out-of-range cell relative to `origin`, or
    /// `None` if the owning chunk is not loaded.
    pub fn neighbor_block(
        &self,
        origin: ChunkCoord,
        local_x: i32,
        local_y: i32,
    ) -> Option<BlockType> {
        let r = self.resolve(origin, local_x, local_y);
        let handle = self.try_get_chunk(r.chunk)?;
        handle.read().get_local(r.local).ok()
    }

    /// Writes a block at a possibly out-of-range cell relative to `origin`,
    /// loading the owning chunk if needed.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Disposed`] if the chunk was evicted concurrently.
    pub fn set_neighbor_block(
        &self,
        origin: ChunkCoord,
        local_x: i32,
        local_y: i32,
        block: BlockType,
    ) -> Result<BlockType, ChunkError> {
        let r = self.resolve(origin, local_x, local_y);
        self.chunk_at(r.chunk).write().set_local(r.local, block)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::SAVE_DIRTY;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn store(size: u32) -> ChunkStore {
        ChunkStore::new(ChunkSize::new(size).unwrap())
    }

    #[test]
    fn test_chunk_at_creates_lazily() {
        let s = store(8);
        let c = ChunkCoord::new(3, -1);
        assert!(s.try_get_chunk(c).is_none());
        assert_eq!(s.loaded_count(), 0);

        let handle = s.chunk_at(c);
        assert_eq!(handle.read().coord(), c);
        assert_eq!(handle.read().get(7, 7), Ok(BlockType::Air));
        assert_eq!(s.loaded_count(), 1);
    }

    #[test]
    fn test_chunk_at_returns_same_instance() {
        let s = store(8);
        let a = s.chunk_at(ChunkCoord::ORIGIN);
        let b = s.chunk_at(ChunkCoord::ORIGIN);
        assert!(Arc::ptr_eq(&a, &b));
        let c = s.try_get_chunk(ChunkCoord::ORIGIN).unwrap();
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_try_get_never_creates() {
        let s = store(4);
        for x in -5..5 {
            assert!(s.try_get_chunk(ChunkCoord::new(x, x)).is_none());
        }
        assert_eq!(s.loaded_count(), 0);
    }

    #[test]
    fn test_concurrent_chunk_at_yields_one_instance() {
        let s = store(16);
        let coord = ChunkCoord::new(-2, 9);
        let shared = &s;
        let handles: Vec<ChunkHandle> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(move || {
                        (0..200)
                            .map(|_| shared.chunk_at(coord))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });
        assert_eq!(s.loaded_count(), 1);
        let first = &handles[0];
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, first)));
    }

    #[test]
    fn test_concurrent_writes_to_distinct_chunks() {
        let s = store(8);
        std::thread::scope(|scope| {
            for t in 0..4i64 {
                let s = &s;
                scope.spawn(move || {
                    let handle = s.chunk_at(ChunkCoord::new(t, 0));
                    let mut chunk = handle.write();
                    for y in 0..8 {
                        for x in 0..8 {
                            chunk.set(x, y, BlockType::Sand).unwrap();
                        }
                    }
                });
            }
        });
        assert_eq!(s.loaded_coords().len(), 4);
        for t in 0..4 {
            let h = s.try_get_chunk(ChunkCoord::new(t, 0)).unwrap();
            assert!(h.read().blocks().iter().all(|&b| b == BlockType::Sand));
        }
    }

    #[test]
    fn test_evict_disposes_outstanding_handles() {
        let s = store(4);
        let c = ChunkCoord::new(1, 1);
        let handle = s.chunk_at(c);
        handle.write().set(0, 0, BlockType::Stone).unwrap();

        assert!(s.evict(c));
        assert!(!s.evict(c));
        assert!(s.try_get_chunk(c).is_none());
        assert_eq!(handle.read().get(0, 0), Err(ChunkError::Disposed(c)));

        // A fresh chunk replaces it on the next access.
        let fresh = s.chunk_at(c);
        assert!(!Arc::ptr_eq(&handle, &fresh));
        assert_eq!(fresh.read().get(0, 0), Ok(BlockType::Air));
        assert_ne!(fresh.read().generation(), handle.read().generation());
    }

    #[test]
    fn test_loaded_coords_sorted() {
        let s = store(4);
        for c in [(3, 0), (-1, 2), (0, 0), (-1, -5)] {
            s.chunk_at(ChunkCoord::new(c.0, c.1));
        }
        assert_eq!(
            s.loaded_coords(),
            vec![
                ChunkCoord::new(-1, -5),
                ChunkCoord::new(-1, 2),
                ChunkCoord::new(0, 0),
                ChunkCoord::new(3, 0),
            ]
        );
    }

    #[test]
    fn test_dirty_coords_tracks_flags() {
        let s = store(4);
        s.set_block(GlobalCoord::new(0, 0), BlockType::Water).unwrap();
        s.set_block(GlobalCoord::new(5, 0), BlockType::Stone).unwrap();
        s.chunk_at(ChunkCoord::new(9, 9));

        assert_eq!(s.collision_dirty_coords(), vec![ChunkCoord::new(1, 0)]);
        assert_eq!(
            s.dirty_coords(SAVE_DIRTY),
            vec![ChunkCoord::new(0, 0), ChunkCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_global_access_across_negative_chunks() {
        let s = store(3);
        let g = GlobalCoord::new(-1, 7);
        assert_eq!(s.block_at(g), None);
        assert_eq!(s.set_block(g, BlockType::Dirt), Ok(BlockType::Air));
        assert_eq!(s.block_at(g), Some(BlockType::Dirt));

        let chunk = s.try_get_chunk(ChunkCoord::new(-1, 2)).unwrap();
        assert_eq!(chunk.read().get(2, 1), Ok(BlockType::Dirt));
    }

    #[test]
    fn test_neighbor_block_crosses_chunk_edges() {
        let s = store(8);
        let origin = ChunkCoord::new(0, 0);
        s.set_block(GlobalCoord::new(-1, 3), BlockType::Metal).unwrap();
        s.set_block(GlobalCoord::new(8, 8), BlockType::Sand).unwrap();

        assert_eq!(s.neighbor_block(origin, -1, 3), Some(BlockType::Metal));
        assert_eq!(s.neighbor_block(origin, 8, 8), Some(BlockType::Sand));
        // Unloaded neighbor.
        assert_eq!(s.neighbor_block(origin, 3, -1), None);

        s.set_neighbor_block(origin, 3, -1, BlockType::Water).unwrap();
        assert_eq!(s.block_at(GlobalCoord::new(3, -1)), Some(BlockType::Water));
    }

    #[test]
    fn test_relative_and_global_access_agree() {
        let s = store(5);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let origin = ChunkCoord::new(rng.random_range(-4..4), rng.random_range(-4..4));
            let (x, y) = (rng.random_range(-20..20), rng.random_range(-20..20));
            let block = BlockType::ALL[rng.random_range(0..BlockType::COUNT)];
            s.set_neighbor_block(origin, x, y, block).unwrap();

            let global = origin
                .origin_block(s.chunk_size())
                .offset(i64::from(x), i64::from(y));
            assert_eq!(s.block_at(global), Some(block));
        }
    }
}
