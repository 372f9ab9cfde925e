//! Stage 1: maximal runs of solid cells along each axis.

use serde::{Deserialize, Serialize};
use sandgrid_world::OccupancyGrid;

/// Sweep direction of a [`LineSegment`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    /// Along `+x`, within one row.
    Horizontal,
    /// Along `+y`, within one column.
    Vertical,
}

/// A run of `length >= 1` contiguous solid cells starting at `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineSegment {
    pub x: u32,
    pub y: u32,
    pub length: u32,
    pub axis: Axis,
}

impl LineSegment {
    pub const fn horizontal(x: u32, y: u32, length: u32) -> Self {
        Self {
            x,
            y,
            length,
            axis: Axis::Horizontal,
        }
    }

    pub const fn vertical(x: u32, y: u32, length: u32) -> Self {
        Self {
            x,
            y,
            length,
            axis: Axis::Vertical,
        }
    }

    /// The last cell covered by the run.
    pub const fn end(&self) -> (u32, u32) {
        match self.axis {
            Axis::Horizontal => (self.x + self.length - 1, self.y),
            Axis::Vertical => (self.x, self.y + self.length - 1),
        }
    }

    /// Every cell covered by the run, in sweep order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.length).map(move |i| match self.axis {
            Axis::Horizontal => (self.x + i, self.y),
            Axis::Vertical => (self.x, self.y + i),
        })
    }
}

/// Maximal horizontal runs, row by row from `y = 0`, left to right.
pub fn horizontal_lines(grid: &OccupancyGrid) -> Vec<LineSegment> {
    let size = grid.size();
    let mut lines = Vec::new();
    for y in 0..size {
        sweep(size, |i| grid.get(i, y), |start, len| {
            lines.push(LineSegment::horizontal(start as u32, y as u32, len as u32));
        });
    }
    lines
}

/// Maximal vertical runs, column by column from `x = 0`, bottom to top.
pub fn vertical_lines(grid: &OccupancyGrid) -> Vec<LineSegment> {
    let size = grid.size();
    let mut lines = Vec::new();
    for x in 0..size {
        sweep(size, |i| grid.get(x, i), |start, len| {
            lines.push(LineSegment::vertical(x as u32, start as u32, len as u32));
        });
    }
    lines
}

/// Calls `emit(start, len)` for each maximal run of `solid` over `0..size`.
fn sweep(size: usize, solid: impl Fn(usize) -> bool, mut emit: impl FnMut(usize, usize)) {
    let mut i = 0;
    while i < size {
        if !solid(i) {
            i += 1;
            continue;
        }
        let start = i;
        while i < size && solid(i) {
            i += 1;
        }
        emit(start, i - start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_has_no_lines() {
        let grid = OccupancyGrid::empty(6);
        assert!(horizontal_lines(&grid).is_empty());
        assert!(vertical_lines(&grid).is_empty());
    }

    #[test]
    fn test_full_grid_has_one_line_per_row_and_column() {
        let grid = OccupancyGrid::filled(4);
        let h = horizontal_lines(&grid);
        let v = vertical_lines(&grid);
        assert_eq!(h, (0..4).map(|y| LineSegment::horizontal(0, y, 4)).collect::<Vec<_>>());
        assert_eq!(v, (0..4).map(|x| LineSegment::vertical(x, 0, 4)).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_cell_yields_unit_lines() {
        let grid = OccupancyGrid::from_fn(5, |x, y| (x, y) == (3, 1));
        assert_eq!(horizontal_lines(&grid), vec![LineSegment::horizontal(3, 1, 1)]);
        assert_eq!(vertical_lines(&grid), vec![LineSegment::vertical(3, 1, 1)]);
    }

    #[test]
    fn test_runs_are_maximal_and_ordered() {
        let grid = OccupancyGrid::from_rows(&[
            "##.##",
            ".###.",
            ".....",
            "#...#",
            "#####",
        ]);
        assert_eq!(
            horizontal_lines(&grid),
            vec![
                LineSegment::horizontal(0, 0, 2),
                LineSegment::horizontal(3, 0, 2),
                LineSegment::horizontal(1, 1, 3),
                LineSegment::horizontal(0, 3, 1),
                LineSegment::horizontal(4, 3, 1),
                LineSegment::horizontal(0, 4, 5),
            ]
        );
        assert_eq!(
            vertical_lines(&grid),
            vec![
                LineSegment::vertical(0, 0, 1),
                LineSegment::vertical(0, 3, 2),
                LineSegment::vertical(1, 0, 2),
                LineSegment::vertical(1, 4, 1),
                LineSegment::vertical(2, 1, 1),
                LineSegment::vertical(2, 4, 1),
                LineSegment::vertical(3, 0, 2),
                LineSegment::vertical(3, 4, 1),
                LineSegment::vertical(4, 0, 1),
                LineSegment::vertical(4, 3, 2),
            ]
        );
    }

    #[test]
    fn test_segment_cells_and_end() {
        let h = LineSegment::horizontal(2, 7, 3);
        assert_eq!(h.end(), (4, 7));
        assert_eq!(h.cells().collect::<Vec<_>>(), vec![(2, 7), (3, 7), (4, 7)]);
        let v = LineSegment::vertical(1, 0, 2);
        assert_eq!(v.end(), (1, 1));
        assert_eq!(v.cells().count(), 2);
    }
}
