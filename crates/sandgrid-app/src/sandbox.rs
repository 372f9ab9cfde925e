//! Headless sandbox: a chunk store, a block catalog, and collider upkeep,
//! plus a few drawing and gravity helpers to exercise them.

use std::collections::BTreeMap;
use std::sync::Arc;

use sandgrid_blocks::{BlockCatalog, BlockState, BlockType};
use sandgrid_collision::{
    ChunkColliderCache, ColliderBackend, ColliderRect, RebuildReport, rebuild_dirty,
};
use sandgrid_config::{Config, ConfigError};
use sandgrid_coords::{ChunkCoord, ChunkSize, GlobalCoord};
use sandgrid_world::{ChunkError, ChunkStore};

/// Errors surfaced by the sandbox.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),
}

/// A world plus the state needed to keep its colliders current.
pub struct Sandbox {
    store: ChunkStore,
    catalog: Arc<BlockCatalog>,
    colliders: ChunkColliderCache,
    collision_enabled: bool,
}

impl Sandbox {
    /// Builds an empty world from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChunkSize`] for a zero chunk size.
    pub fn new(config: &Config, catalog: Arc<BlockCatalog>) -> Result<Self, SandboxError> {
        let size = config.chunk_size()?;
        Ok(Self {
            store: ChunkStore::new(size),
            catalog,
            colliders: ChunkColliderCache::with_preference(config.collision.merge),
            collision_enabled: config.collision.enabled,
        })
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    pub fn colliders(&self) -> &ChunkColliderCache {
        &self.colliders
    }

    pub fn chunk_size(&self) -> ChunkSize {
        self.store.chunk_size()
    }

    /// Loads every chunk within `radius` of the origin.
    pub fn preload(&self, radius: u32) {
        for coord in ChunkCoord::ORIGIN.square_around(radius) {
            self.store.chunk_at(coord);
        }
        tracing::debug!(radius, loaded = self.store.loaded_count(), "Preloaded chunks");
    }

    /// Fills the `width × height` rectangle whose minimum corner is `min`.
    /// Chunks it touches are loaded as needed. Returns the number of cells
    /// that changed.
    ///
    /// # Errors
    ///
    /// Propagates chunk access errors.
    pub fn fill_rect(
        &self,
        min: GlobalCoord,
        width: u32,
        height: u32,
        block: BlockType,
    ) -> Result<usize, SandboxError> {
        let mut changed = 0;
        for dy in 0..i64::from(height) {
            for dx in 0..i64::from(width) {
                if self.store.set_block(min.offset(dx, dy), block)? != block {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Fills a disc of `radius` cells around `center`. Returns the number of
    /// cells that changed.
    ///
    /// # Errors
    ///
    /// Propagates chunk access errors.
    pub fn fill_disc(
        &self,
        center: GlobalCoord,
        radius: u32,
        block: BlockType,
    ) -> Result<usize, SandboxError> {
        let r = i64::from(radius);
        let mut changed = 0;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r
                    && self.store.set_block(center.offset(dx, dy), block)? != block
                {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    /// Sets every combustible block in the rectangle on fire. Returns how
    /// many were ignited.
    ///
    /// # Errors
    ///
    /// Propagates chunk access errors.
    pub fn ignite_rect(
        &self,
        min: GlobalCoord,
        width: u32,
        height: u32,
    ) -> Result<usize, SandboxError> {
        let size = self.chunk_size();
        let mut ignited = 0;
        for dy in 0..i64::from(height) {
            for dx in 0..i64::from(width) {
                let (coord, local) = min.offset(dx, dy).decompose(size);
                let Some(handle) = self.store.try_get_chunk(coord) else {
                    continue;
                };
                let mut chunk = handle.write();
                if self.catalog.can_burn(chunk.get_local(local)?) {
                    chunk.set_state(local.x, local.y, BlockState::Burning, &self.catalog)?;
                    ignited += 1;
                }
            }
        }
        Ok(ignited)
    }

    /// Moves every falling block one cell down (`-y`) into Air, crossing
    /// chunk edges through the neighborhood resolver. A block keeps its state
    /// as it falls, so burning oil stays lit. Chunks are visited in
    /// ascending coordinate order and rows bottom to top, so each block moves
    /// at most once per call. Returns the number of blocks moved.
    ///
    /// # Errors
    ///
    /// Propagates chunk access errors.
    pub fn step_gravity(&self) -> Result<usize, SandboxError> {
        let size = self.chunk_size().get();
        let mut moved = 0;
        for coord in self.store.loaded_coords() {
            let Some(handle) = self.store.try_get_chunk(coord) else {
                continue;
            };
            for y in 0..size {
                for x in 0..size {
                    let (block, state) = {
                        let chunk = handle.read();
                        (chunk.get(x, y)?, chunk.state(x, y)?)
                    };
                    if !self.falls(block) {
                        continue;
                    }
                    // Unloaded space below acts as a floor.
                    if self.store.neighbor_block(coord, x, y - 1) != Some(BlockType::Air) {
                        continue;
                    }
                    let below = self.store.resolve(coord, x, y - 1);
                    {
                        let target = self.store.chunk_at(below.chunk);
                        let mut target = target.write();
                        target.set_local(below.local, block)?;
                        target.set_state(below.local.x, below.local.y, state, &self.catalog)?;
                    }
                    handle.write().set(x, y, BlockType::Air)?;
                    moved += 1;
                }
            }
        }
        Ok(moved)
    }

    /// Regenerates colliders for chunks edited since the last call.
    pub fn rebuild_colliders(&mut self, backend: &mut impl ColliderBackend) -> RebuildReport {
        if !self.collision_enabled {
            return RebuildReport::default();
        }
        rebuild_dirty(&self.store, &self.catalog, &mut self.colliders, backend)
    }

    /// Total solid cells over all loaded chunks.
    pub fn solid_cells(&self) -> Result<usize, SandboxError> {
        let mut total = 0;
        for coord in self.store.loaded_coords() {
            if let Some(handle) = self.store.try_get_chunk(coord) {
                total += handle.read().solid_count(&self.catalog)?;
            }
        }
        Ok(total)
    }

    fn falls(&self, block: BlockType) -> bool {
        block == BlockType::Sand || self.catalog.is_liquid(block)
    }
}

/// Backend that records collider sets and reports them through `tracing`.
#[derive(Debug)]
pub struct LoggingBackend {
    show_colliders: bool,
    live: BTreeMap<ChunkCoord, Vec<ColliderRect>>,
    size: ChunkSize,
}

impl LoggingBackend {
    /// `size` is used to report world positions when `show_colliders` is set.
    pub fn new(show_colliders: bool, size: ChunkSize) -> Self {
        Self {
            show_colliders,
            live: BTreeMap::new(),
            size,
        }
    }

    /// Chunks with colliders currently registered.
    pub fn chunk_count(&self) -> usize {
        self.live.len()
    }

    /// Colliders currently registered across all chunks.
    pub fn collider_count(&self) -> usize {
        self.live.values().map(Vec::len).sum()
    }

    pub fn colliders_for(&self, chunk: ChunkCoord) -> Option<&[ColliderRect]> {
        self.live.get(&chunk).map(Vec::as_slice)
    }
}

impl ColliderBackend for LoggingBackend {
    fn register(&mut self, chunk: ChunkCoord, colliders: &[ColliderRect]) {
        tracing::debug!(?chunk, count = colliders.len(), "Registering colliders");
        if self.show_colliders {
            for rect in colliders {
                let origin = rect.world_origin(chunk, self.size);
                tracing::info!(
                    ?chunk,
                    x = origin.x,
                    y = origin.y,
                    width = rect.width,
                    height = rect.height,
                    "Collider"
                );
            }
        }
        self.live.insert(chunk, colliders.to_vec());
    }

    fn unregister(&mut self, chunk: ChunkCoord) {
        tracing::debug!(?chunk, "Unregistering colliders");
        self.live.remove(&chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(chunk_size: u32) -> Sandbox {
        let mut config = Config::default();
        config.world.chunk_size = chunk_size;
        Sandbox::new(&config, Arc::new(BlockCatalog::standard())).unwrap()
    }

    fn backend(s: &Sandbox) -> LoggingBackend {
        LoggingBackend::new(true, s.chunk_size())
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let mut config = Config::default();
        config.world.chunk_size = 0;
        let result = Sandbox::new(&config, Arc::new(BlockCatalog::standard()));
        assert!(matches!(
            result,
            Err(SandboxError::Config(ConfigError::InvalidChunkSize(_)))
        ));
    }

    #[test]
    fn test_preload_loads_square() {
        let s = sandbox(8);
        s.preload(2);
        assert_eq!(s.store().loaded_count(), 25);
    }

    #[test]
    fn test_fill_rect_spans_chunks() {
        let s = sandbox(8);
        let changed = s
            .fill_rect(GlobalCoord::new(-4, -4), 8, 8, BlockType::Stone)
            .unwrap();
        assert_eq!(changed, 64);
        assert_eq!(s.store().loaded_count(), 4);
        assert_eq!(s.solid_cells().unwrap(), 64);

        // Refilling with the same block changes nothing.
        let again = s
            .fill_rect(GlobalCoord::new(-4, -4), 8, 8, BlockType::Stone)
            .unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_colliders_for_rect_across_four_chunks() {
        let mut s = sandbox(8);
        s.fill_rect(GlobalCoord::new(-4, -4), 8, 8, BlockType::Stone)
            .unwrap();
        let mut b = backend(&s);
        let report = s.rebuild_colliders(&mut b);
        assert_eq!(report.rebuilt, 4);
        assert_eq!(b.chunk_count(), 4);
        assert_eq!(b.collider_count(), 4);
        assert_eq!(
            b.colliders_for(ChunkCoord::new(-1, -1)),
            Some(&[ColliderRect::new(4, 4, 4, 4)][..])
        );
        assert_eq!(
            b.colliders_for(ChunkCoord::new(0, 0)),
            Some(&[ColliderRect::new(0, 0, 4, 4)][..])
        );
    }

    #[test]
    fn test_sand_falls_across_chunk_edge() {
        let s = sandbox(4);
        s.fill_rect(GlobalCoord::new(0, -4), 4, 1, BlockType::Stone)
            .unwrap();
        s.store()
            .set_block(GlobalCoord::new(1, 1), BlockType::Sand)
            .unwrap();

        let mut steps = 0;
        while s.step_gravity().unwrap() > 0 {
            steps += 1;
            assert!(steps < 16, "sand never settled");
        }
        // Resting on the stone floor in the chunk below.
        assert_eq!(steps, 4);
        assert_eq!(s.store().block_at(GlobalCoord::new(1, -3)), Some(BlockType::Sand));
        assert_eq!(s.store().block_at(GlobalCoord::new(1, 1)), Some(BlockType::Air));
    }

    #[test]
    fn test_sand_stops_at_unloaded_space() {
        let s = sandbox(4);
        s.store()
            .set_block(GlobalCoord::new(2, 0), BlockType::Sand)
            .unwrap();
        assert_eq!(s.step_gravity().unwrap(), 0);
    }

    #[test]
    fn test_ignite_only_combustible() {
        let s = sandbox(8);
        s.fill_rect(GlobalCoord::new(0, 0), 2, 1, BlockType::Oil)
            .unwrap();
        s.fill_rect(GlobalCoord::new(2, 0), 2, 1, BlockType::Water)
            .unwrap();
        assert_eq!(s.ignite_rect(GlobalCoord::new(0, 0), 4, 1).unwrap(), 2);
        let chunk = s.store().try_get_chunk(ChunkCoord::ORIGIN).unwrap();
        assert_eq!(chunk.read().state(0, 0), Ok(BlockState::Burning));
        assert_eq!(chunk.read().state(2, 0), Ok(BlockState::None));
    }

    #[test]
    fn test_burning_oil_stays_lit_while_falling() {
        let s = sandbox(4);
        s.fill_rect(GlobalCoord::new(0, -4), 4, 1, BlockType::Stone)
            .unwrap();
        s.store()
            .set_block(GlobalCoord::new(1, 1), BlockType::Oil)
            .unwrap();
        assert_eq!(s.ignite_rect(GlobalCoord::new(1, 1), 1, 1).unwrap(), 1);

        while s.step_gravity().unwrap() > 0 {}

        let (coord, local) = GlobalCoord::new(1, -3).decompose(s.chunk_size());
        let chunk = s.store().try_get_chunk(coord).unwrap();
        assert_eq!(chunk.read().get_local(local), Ok(BlockType::Oil));
        assert_eq!(
            chunk.read().state(local.x, local.y),
            Ok(BlockState::Burning)
        );
        let origin = s.store().try_get_chunk(ChunkCoord::ORIGIN).unwrap();
        assert_eq!(origin.read().state(1, 1), Ok(BlockState::None));
    }

    #[test]
    fn test_disabled_collision_skips_rebuild() {
        let mut config = Config::default();
        config.world.chunk_size = 8;
        config.collision.enabled = false;
        let mut s = Sandbox::new(&config, Arc::new(BlockCatalog::standard())).unwrap();
        s.fill_disc(GlobalCoord::new(0, 0), 3, BlockType::Dirt)
            .unwrap();
        let mut b = backend(&s);
        assert_eq!(s.rebuild_colliders(&mut b), RebuildReport::default());
        assert_eq!(b.collider_count(), 0);
    }

    #[test]
    fn test_disc_covered_exactly_by_colliders() {
        let mut s = sandbox(16);
        let changed = s
            .fill_disc(GlobalCoord::new(0, 0), 5, BlockType::Metal)
            .unwrap();
        let mut b = backend(&s);
        s.rebuild_colliders(&mut b);

        let covered: u64 = s
            .store()
            .loaded_coords()
            .into_iter()
            .filter_map(|c| b.colliders_for(c))
            .flatten()
            .map(ColliderRect::area)
            .sum();
        assert_eq!(covered, changed as u64);
        assert_eq!(s.colliders().total_colliders(), b.collider_count());
    }
}
