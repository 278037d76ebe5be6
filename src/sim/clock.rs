//! Fixed-step frame clock
//!
//! Turns variable frame times into a whole number of fixed `SIM_DT` ticks.
//! Leftover time carries into the next frame.

use crate::consts::{MAX_DELTA, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    accumulator: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank `frame_dt` seconds and return how many ticks to run now
    pub fn advance(&mut self, frame_dt: f64) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_DELTA)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        // Spiral of death guard: drop what we could not simulate
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Time banked but not yet simulated
    pub fn pending(&self) -> f64 {
        self.accumulator
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
