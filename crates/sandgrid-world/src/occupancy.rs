//! Boolean solid/empty snapshots of a chunk.

use std::fmt;

/// A `size × size` grid of solid flags, row-major with `x` fastest.
///
/// Owned and detached from the chunk it was taken from, so collision
/// generation can run without holding the chunk lock.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OccupancyGrid {
    size: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// An all-empty grid.
    pub fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// An all-solid grid.
    pub fn filled(size: usize) -> Self {
        Self {
            size,
            cells: vec![true; size * size],
        }
    }

    /// Builds a grid by evaluating `solid(x, y)` for every cell.
    pub fn from_fn(size: usize, mut solid: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(solid(x, y));
            }
        }
        Self { size, cells }
    }

    /// Builds a grid from text rows where `#` is solid and anything else is
    /// empty. Row 0 is `y = 0`. Short rows are padded with empty cells; the
    /// grid side is the larger of the row count and the longest row.
    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0)
            .max(rows.len());
        let mut grid = Self::empty(size);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                grid.set(x, y, c == '#');
            }
        }
        grid
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the cell at `(x, y)` is solid.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is `>= size`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.size && y < self.size, "({x}, {y}) outside grid");
        self.cells[y * self.size + x]
    }

    /// Sets the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is `>= size`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        assert!(x < self.size && y < self.size, "({x}, {y}) outside grid");
        self.cells[y * self.size + x] = solid;
    }

    /// Number of solid cells.
    pub fn solid_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_all_empty(&self) -> bool {
        !self.cells.contains(&true)
    }

    pub fn is_all_solid(&self) -> bool {
        !self.cells.contains(&false)
    }

    /// One row of the grid.
    pub fn row(&self, y: usize) -> &[bool] {
        &self.cells[y * self.size..(y + 1) * self.size]
    }
}

impl fmt::Debug for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OccupancyGrid({0}x{0})", self.size)?;
        for y in 0..self.size {
            let row: String = self
                .row(y)
                .iter()
                .map(|&c| if c { '#' } else { '.' })
                .collect();
            writeln!(f, "  {row}")?;
        }
        Ok(())
    }
}
