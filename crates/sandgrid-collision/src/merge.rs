//! Stage 2: merging line segments into non-overlapping rectangles.
//!
//! Maximal runs along one axis already partition the solid cells exactly.
//! Stacking runs that repeat unchanged (same start, same length) on the next
//! row or column turns that partition into rectangles without ever splitting
//! or overlapping a cell. Both axes are tried; [`MergePreference`] decides
//! which partition is kept.

use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use sandgrid_coords::{ChunkCoord, ChunkSize, GlobalCoord};

use crate::lines::{Axis, LineSegment};

/// An axis-aligned rectangle of cells in chunk-local coordinates.
///
/// Covers `x..x + width` by `y..y + height`; both extents are at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColliderRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ColliderRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered.
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }

    /// Returns `true` if the two rectangles share at least one cell.
    pub const fn overlaps(&self, other: &ColliderRect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Every covered cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| (x, y)))
    }

    /// Global coordinate of the rectangle's minimum cell.
    pub fn world_origin(&self, chunk: ChunkCoord, size: ChunkSize) -> GlobalCoord {
        chunk
            .origin_block(size)
            .offset(i64::from(self.x), i64::from(self.y))
    }

    /// World-space `(min, max)` corners, with each cell `cell_size` units wide.
    ///
    /// Precision is that of `f32`, so callers far from the origin should
    /// rebase first.
    pub fn world_bounds(
        &self,
        chunk: ChunkCoord,
        size: ChunkSize,
        cell_size: f32,
    ) -> (Vec2, Vec2) {
        let origin = self.world_origin(chunk, size);
        let min = Vec2::new(origin.x as f32, origin.y as f32) * cell_size;
        let extent = Vec2::new(self.width as f32, self.height as f32) * cell_size;
        (min, min + extent)
    }
}

/// Which stacking axis wins when building the final collider set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergePreference {
    /// Keep whichever partition has fewer rectangles; horizontal on a tie.
    #[default]
    Fewest,
    /// Always stack horizontal runs across rows.
    Horizontal,
    /// Always stack vertical runs across columns.
    Vertical,
}

/// Merges stage 1 output into rectangles covering exactly the solid cells.
///
/// Output is sorted by `(y, x)` of each rectangle's minimum cell and depends
/// only on the input segments, never on hash iteration order.
pub fn merge_colliders(
    horizontal: &[LineSegment],
    vertical: &[LineSegment],
    preference: MergePreference,
) -> Vec<ColliderRect> {
    let mut rects = match preference {
        MergePreference::Horizontal => stack_runs(horizontal, Axis::Horizontal),
        MergePreference::Vertical => stack_runs(vertical, Axis::Vertical),
        MergePreference::Fewest => {
            let by_rows = stack_runs(horizontal, Axis::Horizontal);
            let by_columns = stack_runs(vertical, Axis::Vertical);
            if by_columns.len() < by_rows.len() {
                by_columns
            } else {
                by_rows
            }
        }
    };
    rects.sort_unstable_by_key(|r| (r.y, r.x));
    rects
}

/// Stacks runs of one axis into rectangles.
///
/// A run extends the rectangle opened on the previous lane (row for
/// horizontal runs, column for vertical ones) when it starts at the same
/// offset with the same length. Runs of the other axis are ignored.
fn stack_runs(segments: &[LineSegment], axis: Axis) -> Vec<ColliderRect> {
    // (lane, offset, length) in lane-major order.
    let mut runs: Vec<(u32, u32, u32)> = segments
        .iter()
        .filter(|s| s.axis == axis)
        .map(|s| match axis {
            Axis::Horizontal => (s.y, s.x, s.length),
            Axis::Vertical => (s.x, s.y, s.length),
        })
        .collect();
    runs.sort_unstable();

    let mut rects: Vec<ColliderRect> = Vec::with_capacity(runs.len());
    // (offset, length) -> (index into rects, last lane covered)
    let mut open: FxHashMap<(u32, u32), (usize, u32)> = FxHashMap::default();

    for (lane, offset, length) in runs {
        if let Some(&(index, last)) = open.get(&(offset, length))
            && last + 1 == lane
        {
            match axis {
                Axis::Horizontal => rects[index].height += 1,
                Axis::Vertical => rects[index].width += 1,
            }
            open.insert((offset, length), (index, lane));
            continue;
        }
        let rect = match axis {
            Axis::Horizontal => ColliderRect::new(offset, lane, length, 1),
            Axis::Vertical => ColliderRect::new(lane, offset, 1, length),
        };
        open.insert((offset, length), (rects.len(), lane));
        rects.push(rect);
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_rows_stack_into_one_rect() {
        let h = [
            LineSegment::horizontal(1, 2, 3),
            LineSegment::horizontal(1, 3, 3),
            LineSegment::horizontal(1, 4, 3),
        ];
        let rects = merge_colliders(&h, &[], MergePreference::Horizontal);
        assert_eq!(rects, vec![ColliderRect::new(1, 2, 3, 3)]);
    }

    #[test]
    fn test_gap_between_rows_breaks_the_stack() {
        let h = [
            LineSegment::horizontal(0, 0, 2),
            LineSegment::horizontal(0, 2, 2),
        ];
        let rects = merge_colliders(&h, &[], MergePreference::Horizontal);
        assert_eq!(
            rects,
            vec![ColliderRect::new(0, 0, 2, 1), ColliderRect::new(0, 2, 2, 1)]
        );
    }

    #[test]
    fn test_different_lengths_do_not_merge() {
        let h = [
            LineSegment::horizontal(0, 0, 3),
            LineSegment::horizontal(0, 1, 2),
        ];
        let rects = merge_colliders(&h, &[], MergePreference::Horizontal);
        assert_eq!(rects.len(), 2);
    }

    #[test]
    fn test_vertical_stacking_builds_columns() {
        let v = [
            LineSegment::vertical(4, 1, 2),
            LineSegment::vertical(5, 1, 2),
            LineSegment::vertical(7, 0, 1),
        ];
        let rects = merge_colliders(&[], &v, MergePreference::Vertical);
        assert_eq!(
            rects,
            vec![ColliderRect::new(7, 0, 1, 1), ColliderRect::new(4, 1, 2, 2)]
        );
    }

    #[test]
    fn test_fewest_picks_smaller_partition() {
        // A 1-wide, 3-tall column: three row runs but one column run.
        let h = [
            LineSegment::horizontal(2, 0, 1),
            LineSegment::horizontal(2, 1, 1),
            LineSegment::horizontal(2, 2, 1),
        ];
        let v = [LineSegment::vertical(2, 0, 3)];
        // Unit rows stack too, so both partitions have one rect: tie goes horizontal.
        assert_eq!(
            merge_colliders(&h, &v, MergePreference::Fewest),
            vec![ColliderRect::new(2, 0, 1, 3)]
        );

        // An "H": row runs on the top and bottom rows cannot stack past the
        // crossbar, while each upright is a single column run.
        let h = [
            LineSegment::horizontal(0, 0, 1),
            LineSegment::horizontal(2, 0, 1),
            LineSegment::horizontal(0, 1, 3),
            LineSegment::horizontal(0, 2, 1),
            LineSegment::horizontal(2, 2, 1),
        ];
        let v = [
            LineSegment::vertical(0, 0, 3),
            LineSegment::vertical(1, 1, 1),
            LineSegment::vertical(2, 0, 3),
        ];
        assert_eq!(merge_colliders(&h, &v, MergePreference::Horizontal).len(), 5);
        assert_eq!(
            merge_colliders(&h, &v, MergePreference::Fewest),
            vec![
                ColliderRect::new(0, 0, 1, 3),
                ColliderRect::new(2, 0, 1, 3),
                ColliderRect::new(1, 1, 1, 1),
            ]
        );
    }

    #[test]
    fn test_tie_goes_to_horizontal() {
        // "##" over "#.": two rects either way, with different shapes.
        let h = [
            LineSegment::horizontal(0, 0, 2),
            LineSegment::horizontal(0, 1, 1),
        ];
        let v = [LineSegment::vertical(0, 0, 2), LineSegment::vertical(1, 0, 1)];
        assert_eq!(
            merge_colliders(&h, &v, MergePreference::Fewest),
            vec![ColliderRect::new(0, 0, 2, 1), ColliderRect::new(0, 1, 1, 1)]
        );
        assert_eq!(
            merge_colliders(&h, &v, MergePreference::Vertical),
            vec![ColliderRect::new(0, 0, 1, 2), ColliderRect::new(1, 0, 1, 1)]
        );
    }

    #[test]
    fn test_rect_geometry() {
        let r = ColliderRect::new(2, 3, 4, 2);
        assert_eq!(r.area(), 8);
        assert!(r.contains(2, 3));
        assert!(r.contains(5, 4));
        assert!(!r.contains(6, 4));
        assert!(!r.contains(2, 5));
        assert_eq!(r.cells().count(), 8);

        assert!(r.overlaps(&ColliderRect::new(5, 4, 1, 1)));
        assert!(!r.overlaps(&ColliderRect::new(6, 3, 1, 1)));
        assert!(!r.overlaps(&ColliderRect::new(2, 5, 4, 1)));
    }

    #[test]
    fn test_world_placement() {
        let size = ChunkSize::new(16).unwrap();
        let r = ColliderRect::new(3, 0, 2, 1);
        assert_eq!(
            r.world_origin(ChunkCoord::new(-1, 2), size),
            GlobalCoord::new(-13, 32)
        );
        let (min, max) = r.world_bounds(ChunkCoord::new(-1, 2), size, 0.5);
        assert_eq!(min, Vec2::new(-6.5, 16.0));
        assert_eq!(max, Vec2::new(-5.5, 16.5));
    }
}
