//! Per-chunk collider bookkeeping: keeps an external physics backend in sync
//! with chunk edits, rebuilds once per tick, and cleans up on eviction.

use rustc_hash::FxHashMap;
use sandgrid_blocks::BlockCatalog;
use sandgrid_coords::ChunkCoord;
use sandgrid_world::{COLLISION_DIRTY, ChunkError, ChunkStore};

use crate::merge::{ColliderRect, MergePreference};
use crate::mesher::generate_with;

/// Receives collider sets. Owns whatever it builds from them.
pub trait ColliderBackend {
    /// Installs the colliders for `chunk`. Only called with a non-empty set,
    /// and only after any previous set for `chunk` was unregistered.
    fn register(&mut self, chunk: ChunkCoord, colliders: &[ColliderRect]);

    /// Drops everything registered for `chunk`.
    fn unregister(&mut self, chunk: ChunkCoord);
}

/// Colliders last handed to the backend for one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedColliders {
    /// Generation of the chunk the colliders were generated from.
    pub generation: u64,
    /// Chunk version the colliders were generated from.
    pub version: u64,
    pub colliders: Vec<ColliderRect>,
}

/// Tracks which chunks currently have colliders registered with the backend.
#[derive(Debug, Default)]
pub struct ChunkColliderCache {
    map: FxHashMap<ChunkCoord, CachedColliders>,
    preference: MergePreference,
}

/// Outcome of one [`rebuild_dirty`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Dirty chunks whose colliders were regenerated.
    pub rebuilt: usize,
    /// Chunks whose colliders were unregistered because the chunk they were
    /// built from was evicted.
    pub removed: usize,
    /// Colliders registered during this pass.
    pub registered: usize,
}

impl ChunkColliderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that merges with the given preference.
    pub fn with_preference(preference: MergePreference) -> Self {
        Self {
            map: FxHashMap::default(),
            preference,
        }
    }

    pub fn preference(&self) -> MergePreference {
        self.preference
    }

    pub fn get(&self, coord: &ChunkCoord) -> Option<&CachedColliders> {
        self.map.get(coord)
    }

    pub fn contains(&self, coord: &ChunkCoord) -> bool {
        self.map.contains_key(coord)
    }

    /// Returns the number of chunks with registered colliders.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Colliders registered across all chunks.
    pub fn total_colliders(&self) -> usize {
        self.map.values().map(|c| c.colliders.len()).sum()
    }

    /// Cached chunk coordinates in ascending order.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.map.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Unregisters and forgets `coord`. Returns `true` if it had colliders.
    pub fn remove(&mut self, coord: ChunkCoord, backend: &mut impl ColliderBackend) -> bool {
        if self.map.remove(&coord).is_some() {
            backend.unregister(coord);
            true
        } else {
            false
        }
    }

    /// Replaces the colliders of `coord`, registering them if non-empty.
    fn replace(
        &mut self,
        coord: ChunkCoord,
        cached: CachedColliders,
        backend: &mut impl ColliderBackend,
    ) {
        self.remove(coord, backend);
        if !cached.colliders.is_empty() {
            backend.register(coord, &cached.colliders);
            self.map.insert(coord, cached);
        }
    }
}

/// Regenerates colliders for every collision-dirty chunk in `store`.
///
/// Each dirty chunk is processed once, in ascending coordinate order, no
/// matter how many edits it received since the last pass; its dirty flag is
/// cleared as its occupancy is snapshotted. Colliders built from a chunk that
/// has since been evicted are unregistered first, including when a new chunk
/// has already been created at the same coordinate.
pub fn rebuild_dirty(
    store: &ChunkStore,
    catalog: &BlockCatalog,
    cache: &mut ChunkColliderCache,
    backend: &mut impl ColliderBackend,
) -> RebuildReport {
    let mut report = RebuildReport::default();

    for coord in cache.coords() {
        let current = store.try_get_chunk(coord).map(|h| h.read().generation());
        let stale = cache
            .get(&coord)
            .is_some_and(|cached| Some(cached.generation) != current);
        if stale && cache.remove(coord, backend) {
            report.removed += 1;
        }
    }

    for coord in store.collision_dirty_coords() {
        let Some(handle) = store.try_get_chunk(coord) else {
            continue;
        };
        let snapshot = {
            let mut chunk = handle.write();
            chunk
                .occupancy_grid(catalog)
                .map(|grid| {
                    chunk.clear_dirty(COLLISION_DIRTY);
                    (grid, chunk.generation(), chunk.version())
                })
        };
        let (grid, generation, version) = match snapshot {
            Ok(s) => s,
            Err(ChunkError::Disposed(_)) => {
                // Evicted between listing and locking.
                if cache.remove(coord, backend) {
                    report.removed += 1;
                }
                continue;
            }
            Err(e) => {
                tracing::error!(?coord, "Collider rebuild failed: {}", e);
                continue;
            }
        };

        let colliders = generate_with(&grid, cache.preference).colliders;
        tracing::trace!(?coord, version, count = colliders.len(), "Rebuilt chunk colliders");
        report.registered += colliders.len();
        report.rebuilt += 1;
        let cached = CachedColliders {
            generation,
            version,
            colliders,
        };
        cache.replace(coord, cached, backend);
    }

    if report.rebuilt > 0 || report.removed > 0 {
        tracing::debug!(
            rebuilt = report.rebuilt,
            removed = report.removed,
            registered = report.registered,
            "Collider rebuild pass"
        );
    }
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
