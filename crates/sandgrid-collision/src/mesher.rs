//! Occupancy grid to collider set, both stages together.

use sandgrid_world::OccupancyGrid;

use crate::lines::{LineSegment, horizontal_lines, vertical_lines};
use crate::merge::{ColliderRect, MergePreference, merge_colliders};

/// Everything the mesher produces for one chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkColliders {
    /// Maximal row runs, row by row.
    pub horizontal: Vec<LineSegment>,
    /// Maximal column runs, column by column.
    pub vertical: Vec<LineSegment>,
    /// Non-overlapping rectangles covering exactly the solid cells, sorted by
    /// `(y, x)`.
    pub colliders: Vec<ColliderRect>,
}

impl ChunkColliders {
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Total cells covered by the colliders.
    pub fn covered_cells(&self) -> u64 {
        self.colliders.iter().map(ColliderRect::area).sum()
    }
}

/// Runs both stages with the default [`MergePreference`].
pub fn generate(grid: &OccupancyGrid) -> ChunkColliders {
    generate_with(grid, MergePreference::default())
}

/// Runs both stages with an explicit merge preference.
pub fn generate_with(grid: &OccupancyGrid, preference: MergePreference) -> ChunkColliders {
    if grid.is_all_empty() {
        return ChunkColliders::default();
    }
    let horizontal = horizontal_lines(grid);
    let vertical = vertical_lines(grid);
    let colliders = merge_colliders(&horizontal, &vertical, preference);
    ChunkColliders {
        horizontal,
        vertical,
        colliders,
    }
}
