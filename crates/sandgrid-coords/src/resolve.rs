//! Chunk neighborhood resolution.
//!
//! Simulation steps walk cells relative to the chunk they started in and may
//! overshoot its bounds by any number of chunk widths in one step. [`resolve`]
//! maps such a coordinate back to the chunk that owns it and the in-range cell
//! inside that chunk. It sits on the per-cell hot path, so it is two
//! `div_euclid`/`rem_euclid` pairs and nothing else: no loops, no branches on
//! direction.

use crate::{ChunkCoord, ChunkSize, LocalCoord};

/// Result of resolving a possibly out-of-range local coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolved {
    /// The in-range cell, each axis in `[0, size)`.
    pub local: LocalCoord,
    /// The chunk that owns the cell.
    pub chunk: ChunkCoord,
}

impl Resolved {
    /// `true` if resolution stayed inside `origin`.
    #[inline]
    pub fn is_same_chunk(&self, origin: ChunkCoord) -> bool {
        self.chunk == origin
    }
}

/// Resolves `(local_x, local_y)`, relative to `origin`, to its owning chunk.
///
/// Total over all `i32` inputs. Each axis is handled independently: the chunk
/// delta is the floor division of the coordinate by `size` and the new local
/// coordinate is the floor modulo. In-range input comes back unchanged with
/// `chunk == origin`.
///
/// ```rust
/// use sandgrid_coords::{ChunkCoord, ChunkSize, LocalCoord, resolve};
///
/// let size = ChunkSize::new(3).unwrap();
/// let r = resolve(4, 7, ChunkCoord::ORIGIN, size);
/// assert_eq!(r.local, LocalCoord::new(1, 1));
/// assert_eq!(r.chunk, ChunkCoord::new(1, 2));
/// ```
#[inline]
pub fn resolve(local_x: i32, local_y: i32, origin: ChunkCoord, size: ChunkSize) -> Resolved {
    let s = size.get();
    // `s >= 1`, so neither operation can overflow.
    let dx = local_x.div_euclid(s);
    let dy = local_y.div_euclid(s);
    Resolved {
        local: LocalCoord::new(local_x.rem_euclid(s), local_y.rem_euclid(s)),
        chunk: origin.offset(i64::from(dx), i64::from(dy)),
    }
}

/// Resolves the cell `(dx, dy)` away from `local` in `origin`.
///
/// Sums are formed in `i64`, so a walk from any in-range cell by any `i32`
/// delta resolves without overflow.
#[inline]
pub fn resolve_offset(
    local: LocalCoord,
    dx: i32,
    dy: i32,
    origin: ChunkCoord,
    size: ChunkSize,
) -> Resolved {
    let s = i64::from(size.get());
    let x = i64::from(local.x) + i64::from(dx);
    let y = i64::from(local.y) + i64::from(dy);
    Resolved {
        // rem_euclid by a positive i32-sized divisor always fits in i32.
        local: LocalCoord::new(x.rem_euclid(s) as i32, y.rem_euclid(s) as i32),
        chunk: origin.offset(x.div_euclid(s), y.div_euclid(s)),
    }
}
