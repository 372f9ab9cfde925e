//! Fixed-rate simulation ticks driven by variable frame times.
//!
//! Frame time is accumulated and spent in whole ticks of [`TICK_DT`], so the
//! world advances at the same rate no matter how frames are paced. Collider
//! regeneration happens once per tick, after that tick's block edits.

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const TICK_DT: f64 = 1.0 / 60.0;

/// Frame time clamp. Longer frames are accepted as slowdown rather than
/// caught up with a burst of ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Accumulator that turns frame times into fixed ticks.
#[derive(Debug, Default)]
pub struct TickClock {
    accumulator: f64,
    tick_count: u64,
    frame_count: u64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `frame_time` seconds and calls `tick_fn(tick_index)` once per
    /// whole tick now due. Returns the number of ticks run.
    pub fn advance(&mut self, frame_time: f64, mut tick_fn: impl FnMut(u64)) -> u32 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }
        self.accumulator += frame_time;

        let mut ran = 0;
        while self.accumulator >= TICK_DT {
            tick_fn(self.tick_count);
            self.accumulator -= TICK_DT;
            self.tick_count += 1;
            ran += 1;
        }
        self.frame_count += 1;
        ran
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        self.accumulator / TICK_DT
    }

    /// Returns the total number of ticks run.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Simulated time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.tick_count as f64 * TICK_DT
    }
}
