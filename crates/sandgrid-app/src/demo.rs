//! The scripted scene the binary runs.

use std::sync::Arc;

use sandgrid_blocks::{BlockCatalog, BlockType};
use sandgrid_config::Config;
use sandgrid_coords::GlobalCoord;

use crate::sandbox::{LoggingBackend, Sandbox, SandboxError};
use crate::tick::{TICK_DT, TickClock};

/// Frames simulated by [`run`], each one [`FRAME_TIME`] long.
pub const FRAMES: u32 = 30;

/// Simulated frame time: a steady 30 FPS, two ticks per frame.
pub const FRAME_TIME: f64 = 2.0 * TICK_DT + 1e-9;

/// Counts reported after the scene has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSummary {
    pub loaded_chunks: usize,
    pub solid_cells: usize,
    pub ticks: u64,
    pub blocks_moved: usize,
    pub collider_chunks: usize,
    pub colliders: usize,
}

/// Builds a small scene that straddles the origin, lets it settle for
/// [`FRAMES`] frames, and keeps colliders current every tick.
///
/// # Errors
///
/// Returns [`SandboxError`] for an invalid config or a chunk access failure.
pub fn run(config: &Config) -> Result<DemoSummary, SandboxError> {
    let catalog = Arc::new(BlockCatalog::standard());
    let mut sandbox = Sandbox::new(config, catalog)?;
    let s = i64::from(sandbox.chunk_size().get());
    let mut backend = LoggingBackend::new(config.debug.show_colliders, sandbox.chunk_size());

    sandbox.preload(config.world.preload_radius);
    stamp_scene(&sandbox, s)?;
    tracing::info!(
        chunk_size = s,
        loaded = sandbox.store().loaded_count(),
        "Scene stamped"
    );

    let mut clock = TickClock::new();
    let mut blocks_moved = 0;
    let mut failure = None;
    for _ in 0..FRAMES {
        clock.advance(FRAME_TIME, |tick| {
            if failure.is_some() {
                return;
            }
            match sandbox.step_gravity() {
                Ok(moved) => blocks_moved += moved,
                Err(e) => failure = Some(e),
            }
            let report = sandbox.rebuild_colliders(&mut backend);
            tracing::trace!(tick, ?report, "Tick");
        });
        if let Some(e) = failure.take() {
            return Err(e);
        }
    }

    let summary = DemoSummary {
        loaded_chunks: sandbox.store().loaded_count(),
        solid_cells: sandbox.solid_cells()?,
        ticks: clock.tick_count(),
        blocks_moved,
        collider_chunks: backend.chunk_count(),
        colliders: backend.collider_count(),
    };
    tracing::info!(?summary, "Scene finished");
    Ok(summary)
}

/// Ground spanning three chunks below the origin, a pillar crossing a chunk
/// row, a sand slab that falls through a chunk edge, and a pool of oil.
fn stamp_scene(sandbox: &Sandbox, s: i64) -> Result<(), SandboxError> {
    let width = |cells: i64| u32::try_from(cells.max(1)).unwrap_or(u32::MAX);

    let ground_top = -s + (s / 4).max(1);
    sandbox.fill_rect(GlobalCoord::new(-s, -s), width(3 * s), width(s / 4), BlockType::Stone)?;
    sandbox.fill_rect(GlobalCoord::new(-s, -s), 1, width(2 * s), BlockType::Border)?;
    sandbox.fill_rect(GlobalCoord::new(s / 2, ground_top), 2, width(s), BlockType::Metal)?;
    sandbox.fill_rect(GlobalCoord::new(-s / 2, s / 4), width(s / 2), 2, BlockType::Sand)?;
    sandbox.fill_disc(GlobalCoord::new(s + s / 2, s / 2), width(s / 8), BlockType::Dirt)?;
    sandbox.fill_rect(GlobalCoord::new(s, ground_top), width(s / 4), 2, BlockType::Oil)?;
    sandbox.ignite_rect(GlobalCoord::new(s, ground_top + 1), width(s / 4), 1)?;
    Ok(())
}
