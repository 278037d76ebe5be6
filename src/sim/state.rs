//! Vehicle state and per-tick outputs
//!
//! Everything the renderer/audio layer reads after a tick lives here.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::consts::MS_TO_KMH;

/// Identifier of a hazard within its field (index order at level load)
pub type HazardId = u32;

/// Mutable record of the car for one race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Fraction of track length travelled, in [0, 1]
    pub progress: f64,
    /// Signed forward speed (units/s)
    pub speed: f64,
    /// Signed offset from the centreline (positive = right)
    pub lateral: f64,
    pub lateral_velocity: f64,
    /// Height above the track surface, never negative
    pub jump_height: f64,
    pub jump_velocity: f64,
    /// Latched after a ramp kick until the car is off every ramp and grounded
    pub ramp_jumped: bool,
    /// Seconds of turbo left
    pub turbo_remaining: f64,
    /// Speed held while the turbo runs
    pub turbo_speed: f64,
    /// Seconds of star invincibility left
    pub star_remaining: f64,
    pub finished: bool,
    /// At least one collectible picked up this race
    pub collectible_collected: bool,
    pub collectible_count: u32,
    /// Terminal hazard latch; stays set until cleared or restart
    pub lava_hit: bool,
    /// Accumulated wheel rotation (radians)
    pub wheel_spin: f64,

    // One-shot event flags, cleared at the start of every tick
    pub collision_hit: bool,
    pub turbo_just_activated: bool,
    pub trampoline_just_launched: bool,
    pub ramp_just_launched: bool,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            progress: 0.0,
            speed: 0.0,
            lateral: 0.0,
            lateral_velocity: 0.0,
            jump_height: 0.0,
            jump_velocity: 0.0,
            ramp_jumped: false,
            turbo_remaining: 0.0,
            turbo_speed: 0.0,
            star_remaining: 0.0,
            finished: false,
            collectible_collected: false,
            collectible_count: 0,
            lava_hit: false,
            wheel_spin: 0.0,
            collision_hit: false,
            turbo_just_activated: false,
            trampoline_just_launched: false,
            ramp_just_launched: false,
        }
    }
}

impl VehicleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the one-shot event flags (start of tick)
    pub fn clear_events(&mut self) {
        self.collision_hit = false;
        self.turbo_just_activated = false;
        self.trampoline_just_launched = false;
        self.ramp_just_launched = false;
    }

    #[inline]
    pub fn turbo_active(&self) -> bool {
        self.turbo_remaining > 0.0
    }

    /// Star invincibility active
    #[inline]
    pub fn invincible(&self) -> bool {
        self.star_remaining > 0.0
    }

    #[inline]
    pub fn airborne(&self) -> bool {
        self.jump_height > 0.0
    }

    /// Speed for the HUD readout
    #[inline]
    pub fn speed_kmh(&self) -> f64 {
        self.speed * MS_TO_KMH
    }

    /// Stop all motion (finished race)
    pub fn freeze(&mut self) {
        self.speed = 0.0;
        self.lateral_velocity = 0.0;
        self.jump_velocity = 0.0;
    }

    /// Keep the car inside `±limit` of the centreline
    pub fn clamp_lateral(&mut self, limit: f64) {
        let limit = limit.max(0.0);
        self.lateral = self.lateral.clamp(-limit, limit);
    }
}

/// Something that happened during a tick, for effects and audio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// Bonked an obstacle or tree
    Collision { hazard: HazardId },
    TurboActivated { hazard: HazardId },
    TrampolineLaunched { hazard: HazardId },
    /// Kicked off the lip of a ramp
    RampLaunched { hazard: HazardId },
    LavaHit { hazard: HazardId },
    Collected { hazard: HazardId },
    StarCollected { hazard: HazardId },
    CheckpointReached { index: usize },
    Finished { time: f64 },
}

/// World-space placement of the car for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    /// Heading in radians (from +Z toward +X), including slip
    pub yaw: f64,
    pub wheel_spin: f64,
    pub airborne: bool,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            yaw: 0.0,
            wheel_spin: 0.0,
            airborne: false,
        }
    }
}
