//! Chunk, local, and global block coordinates, plus the chunk neighborhood resolver.
//!
//! The world is an unbounded grid of blocks sharded into square chunks of
//! [`ChunkSize`] cells per side. A block can be addressed three ways:
//!
//! 1. **Global**: [`GlobalCoord`], one unit per block, unbounded (`i64`).
//! 2. **Chunk**: [`ChunkCoord`], one unit per chunk width (`i64`).
//! 3. **Local**: [`LocalCoord`], a cell inside one chunk, each axis in `[0, size)`.
//!
//! Global coordinates decompose into `(chunk, local)` with floor division and
//! floor modulo, so negative blocks land in the chunk *below* with a
//! non-negative local offset:
//!
//! ```rust
//! use sandgrid_coords::{ChunkCoord, ChunkSize, GlobalCoord, LocalCoord};
//!
//! let size = ChunkSize::new(3).unwrap();
//! let (chunk, local) = GlobalCoord::new(-1, 7).decompose(size);
//! assert_eq!(chunk, ChunkCoord::new(-1, 2));
//! assert_eq!(local, LocalCoord::new(2, 1));
//! assert_eq!(GlobalCoord::compose(chunk, local, size), GlobalCoord::new(-1, 7));
//! ```
//!
//! Chunk and global coordinates wrap at the `i64` boundary: stepping past
//! `i64::MAX` lands on `i64::MIN`. Every coordinate operation is therefore
//! total, and `compose` inverts `decompose` for every global coordinate.

mod resolve;


use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use resolve::{Resolved, resolve, resolve_offset};

/// Errors raised while setting up coordinate parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoordError {
    /// Chunk sizes must be in `1..=i32::MAX`.
    #[error("invalid chunk size {0}: must be between 1 and {max}", max = i32::MAX)]
    InvalidChunkSize(u64),
}

// ---------------------------------------------------------------------------
// ChunkSize
// ---------------------------------------------------------------------------

/// Side length of every chunk in the world, in blocks.
///
/// Fixed once at world startup and shared by value with every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChunkSize(i32);

impl ChunkSize {
    /// Creates a chunk size.
    ///
    /// # Errors
    ///
    /// Returns [`CoordError::InvalidChunkSize`] for zero or for sizes that do
    /// not fit in an `i32`.
    pub fn new(size: u32) -> Result<Self, CoordError> {
        match i32::try_from(size) {
            Ok(s) if s >= 1 => Ok(Self(s)),
            _ => Err(CoordError::InvalidChunkSize(u64::from(size))),
        }
    }

    /// Side length as a signed integer (always positive).
    #[inline]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Side length as a `usize`, for indexing.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Number of cells in one chunk (`size²`).
    #[inline]
    pub const fn area(self) -> usize {
        self.as_usize() * self.as_usize()
    }

    /// Returns `true` if `(x, y)` is a valid local coordinate.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.0 && y < self.0
    }
}

impl TryFrom<u32> for ChunkSize {
    type Error = CoordError;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<ChunkSize> for u32 {
    fn from(size: ChunkSize) -> u32 {
        size.0 as u32
    }
}

// ---------------------------------------------------------------------------
// ChunkCoord
// ---------------------------------------------------------------------------

/// A chunk's position in chunk-space (one unit = one chunk width).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkCoord {
    pub x: i64,
    pub y: i64,
}

impl ChunkCoord {
    pub const ORIGIN: ChunkCoord = ChunkCoord { x: 0, y: 0 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the chunk `(dx, dy)` chunk widths away, wrapping at the `i64`
    /// boundary.
    #[inline]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
        }
    }

    /// The four edge-adjacent chunks, in `+x, -x, +y, -y` order.
    pub const fn edge_neighbors(self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// Global coordinate of this chunk's `(0, 0)` cell, wrapping at the `i64`
    /// boundary.
    #[inline]
    pub fn origin_block(self, size: ChunkSize) -> GlobalCoord {
        let s = i64::from(size.get());
        GlobalCoord::new(self.x.wrapping_mul(s), self.y.wrapping_mul(s))
    }

    /// All chunks within a Chebyshev `radius` of `self`, row by row.
    pub fn square_around(self, radius: u32) -> impl Iterator<Item = ChunkCoord> {
        let r = i64::from(radius);
        (-r..=r).flat_map(move |dy| (-r..=r).map(move |dx| self.offset(dx, dy)))
    }
}

// ---------------------------------------------------------------------------
// LocalCoord
// ---------------------------------------------------------------------------

/// A cell inside one chunk. Produced in-range by [`resolve`] and
/// [`GlobalCoord::decompose`]; hand-built values are checked by chunk accessors.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LocalCoord {
    pub x: i32,
    pub y: i32,
}

impl LocalCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both axes are within `[0, size)`.
    #[inline]
    pub const fn is_within(self, size: ChunkSize) -> bool {
        size.contains(self.x, self.y)
    }
}

impl From<IVec2> for LocalCoord {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<LocalCoord> for IVec2 {
    fn from(c: LocalCoord) -> Self {
        IVec2::new(c.x, c.y)
    }
}

// ---------------------------------------------------------------------------
// GlobalCoord
// ---------------------------------------------------------------------------

/// A block position in the unbounded world.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GlobalCoord {
    pub x: i64,
    pub y: i64,
}

impl GlobalCoord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Splits into the owning chunk and the cell inside it.
    ///
    /// Uses floor division/modulo, so the local part is always in `[0, size)`.
    #[inline]
    pub fn decompose(self, size: ChunkSize) -> (ChunkCoord, LocalCoord) {
        let s = i64::from(size.get());
        let chunk = ChunkCoord::new(self.x.div_euclid(s), self.y.div_euclid(s));
        // rem_euclid by a positive i32-sized divisor always fits in i32.
        let local = LocalCoord::new(self.x.rem_euclid(s) as i32, self.y.rem_euclid(s) as i32);
        (chunk, local)
    }

    /// Inverse of [`decompose`](Self::decompose): `chunk * size + local`.
    #[inline]
    pub fn compose(chunk: ChunkCoord, local: LocalCoord, size: ChunkSize) -> Self {
        chunk
            .origin_block(size)
            .offset(i64::from(local.x), i64::from(local.y))
    }

    /// Returns the block `(dx, dy)` away, wrapping at the `i64` boundary.
    #[inline]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }
}

impl From<IVec2> for GlobalCoord {
    fn from(v: IVec2) -> Self {
        Self::new(i64::from(v.x), i64::from(v.y))
    }
}
