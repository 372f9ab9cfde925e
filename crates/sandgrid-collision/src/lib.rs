//! Collision meshing for sandgrid chunks.
//!
//! A chunk's [`OccupancyGrid`](sandgrid_world::OccupancyGrid) is turned into
//! a short list of non-overlapping rectangles in two stages:
//!
//! 1. [`horizontal_lines`] and [`vertical_lines`] sweep the grid for maximal
//!    runs of solid cells.
//! 2. [`merge_colliders`] stacks identical runs on consecutive rows (or
//!    columns) into rectangles and keeps the smaller partition.
//!
//! [`rebuild_dirty`] drives the mesher once per tick for every chunk whose
//! solid occupancy changed and hands the results to a [`ColliderBackend`].

mod cache;
mod lines;
mod merge;
mod mesher;


pub use cache::{
    CachedColliders, ChunkColliderCache, ColliderBackend, RebuildReport, rebuild_dirty,
};
pub use lines::{Axis, LineSegment, horizontal_lines, vertical_lines};
pub use merge::{ColliderRect, MergePreference, merge_colliders};
pub use mesher::{ChunkColliders, generate, generate_with};
