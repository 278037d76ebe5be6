//! Checkpoints, finish and race clock
//!
//! `Racing → Finished`, terminal until restart. Finishing needs both the
//! end of the track and every checkpoint in order; reaching the end with a
//! checkpoint missed leaves the car parked at `progress = 1`.

use serde::{Deserialize, Serialize};

use super::state::{RaceEvent, VehicleState};
use super::track::TrackCurve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    Racing,
    Finished,
}

/// Checkpoint sequence and finish state for one race
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceProgress {
    /// Strictly increasing fractions in [0, 1)
    checkpoints: Vec<f64>,
    /// Next checkpoint to reach (== len once all are passed)
    index: usize,
    phase: RacePhase,
    /// Distance from a checkpoint that counts as passing it
    hit_radius: f64,
    /// Seconds raced so far
    elapsed: f64,
    finish_time: Option<f64>,
}

impl RaceProgress {
    pub fn new(checkpoints: Vec<f64>, hit_radius: f64) -> Self {
        Self {
            checkpoints,
            index: 0,
            phase: RacePhase::Racing,
            hit_radius,
            elapsed: 0.0,
            finish_time: None,
        }
    }

    /// Checkpoints passed so far
    #[inline]
    pub fn checkpoint_index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    #[inline]
    pub fn all_checkpoints_passed(&self) -> bool {
        self.index >= self.checkpoints.len()
    }

    /// Next checkpoint fraction, if any remain
    pub fn next_checkpoint(&self) -> Option<f64> {
        self.checkpoints.get(self.index).copied()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn finish_time(&self) -> Option<f64> {
        self.finish_time
    }

    /// HUD text, e.g. "2/3"
    pub fn checkpoint_label(&self) -> String {
        format!("{}/{}", self.index, self.checkpoints.len())
    }

    /// Run the clock while racing
    pub fn advance_clock(&mut self, delta: f64) {
        if self.phase == RacePhase::Racing {
            self.elapsed += delta;
        }
    }

    /// Advance checkpoints and check the finish condition
    ///
    /// `previous_progress` is the progress at the start of the tick; a
    /// checkpoint swept over during the tick counts even if neither end
    /// landed inside the hit radius.
    pub fn update(
        &mut self,
        track: &TrackCurve,
        previous_progress: f64,
        state: &mut VehicleState,
        events: &mut Vec<RaceEvent>,
    ) {
        if self.is_finished() {
            return;
        }

        let here = track.point_at(state.progress);
        let (lo, hi) = if previous_progress <= state.progress {
            (previous_progress, state.progress)
        } else {
            (state.progress, previous_progress)
        };

        while let Some(target_t) = self.next_checkpoint() {
            let within = here.distance(track.point_at(target_t)) < self.hit_radius;
            let swept = (lo..=hi).contains(&target_t);
            if !(within || swept) {
                break;
            }
            log::info!(
                "Checkpoint {}/{} at {:.2}s",
                self.index + 1,
                self.checkpoints.len(),
                self.elapsed
            );
            events.push(RaceEvent::CheckpointReached { index: self.index });
            self.index += 1;
        }

        if state.progress >= 1.0 && self.all_checkpoints_passed() {
            self.phase = RacePhase::Finished;
            self.finish_time = Some(self.elapsed);
            state.finished = true;
            log::info!("Finished in {:.2}s", self.elapsed);
            events.push(RaceEvent::Finished { time: self.elapsed });
        }
    }

    /// Back to the start line
    pub fn reset(&mut self) {
        self.index = 0;
        self.phase = RacePhase::Racing;
        self.elapsed = 0.0;
        self.finish_time = None;
    }
}
