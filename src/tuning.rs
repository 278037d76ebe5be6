//! Physics and hazard tuning
//!
//! Every balance number the simulation reads lives here so levels and
//! difficulty presets can be swapped without touching the integrator.
//! Loaded from JSON; missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a tuning document
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(&'static str),
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Casual,
    #[default]
    Standard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Casual => "Casual",
            Difficulty::Standard => "Standard",
            Difficulty::Expert => "Expert",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "casual" | "easy" => Some(Difficulty::Casual),
            "standard" | "normal" => Some(Difficulty::Standard),
            "expert" | "hard" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    /// Multiplier on top speed and acceleration
    pub fn speed_scale(&self) -> f64 {
        match self {
            Difficulty::Casual => 0.85,
            Difficulty::Standard => 1.0,
            Difficulty::Expert => 1.15,
        }
    }

    /// Multiplier on the curvature pull through bends
    pub fn curve_scale(&self) -> f64 {
        match self {
            Difficulty::Casual => 0.6,
            Difficulty::Standard => 1.0,
            Difficulty::Expert => 1.4,
        }
    }
}

/// Vehicle integration constants
///
/// Factors documented "per frame" are per 1/60 s reference frame and are
/// applied through [`crate::frame_decay`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Forward acceleration (units/s²)
    pub accel: f64,
    /// Reverse acceleration (units/s²)
    pub reverse_accel: f64,
    /// Coasting drag, per frame
    pub drag: f64,
    pub max_speed: f64,
    /// Reverse speed cap (positive magnitude)
    pub max_reverse: f64,
    /// Lateral acceleration from steering (units/s²)
    pub steer_force: f64,
    /// Lateral velocity damping rate (1/s)
    pub drift_drag: f64,
    /// Curvature coupling: lateral velocity gained per tick per (rad · speed²)
    pub curve_force: f64,
    /// Vertical acceleration (negative = down)
    pub gravity: f64,
    /// Track fraction travelled per unit of speed per second
    pub speed_to_progress: f64,
    /// Distance kept between the car centre and the track edge
    pub lateral_margin: f64,
    /// Edge penalty applies once the car is within this distance of the edge
    pub edge_margin: f64,
    /// Speed kept per frame while riding the edge
    pub edge_slowdown: f64,
    /// Below this |speed| steering is ignored and lateral drift dies out
    pub steer_speed_threshold: f64,
    /// Lateral velocity kept per frame while stationary
    pub idle_lateral_decay: f64,
    /// Ramp fraction past which the kicker launches the car
    pub ramp_launch_fraction: f64,
    /// Minimum forward speed for a ramp launch
    pub ramp_jump_speed_min: f64,
    pub ramp_jump_boost_speed_factor: f64,
    pub ramp_jump_boost_base: f64,
    /// Speed floor when computing the visual slip angle
    pub slip_speed_floor: f64,
    pub slip_yaw_scale: f64,
    /// Largest delta a single tick integrates
    pub max_delta: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            accel: 22.0,
            reverse_accel: 18.0,
            drag: 0.94,
            max_speed: 48.0,
            max_reverse: 22.0,
            steer_force: 8.0,
            drift_drag: 3.4,
            curve_force: 0.0014,
            gravity: -30.0,
            speed_to_progress: 0.0025,
            lateral_margin: 0.6,
            edge_margin: 0.9,
            edge_slowdown: 0.97,
            steer_speed_threshold: 0.5,
            idle_lateral_decay: 0.6,
            ramp_launch_fraction: 0.85,
            ramp_jump_speed_min: 12.0,
            ramp_jump_boost_speed_factor: 0.22,
            ramp_jump_boost_base: 4.0,
            slip_speed_floor: 6.0,
            slip_yaw_scale: 0.2,
            max_delta: crate::consts::MAX_DELTA,
        }
    }
}

/// Car body dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarTuning {
    /// Half width across the track
    pub half_x: f64,
    /// Half length along the track
    pub half_z: f64,
    /// Ride height of the body origin above the track surface
    pub base_y: f64,
    pub wheel_radius: f64,
    pub wheel_spin_min_radius: f64,
}

impl Default for CarTuning {
    fn default() -> Self {
        Self {
            half_x: 1.2,
            half_z: 2.1,
            base_y: 0.7,
            wheel_radius: 0.45,
            wheel_spin_min_radius: 0.2,
        }
    }
}

/// Footprint and response of a solid blocker (obstacle or tree)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockerTuning {
    /// Footprint width across the track
    pub width: f64,
    /// Footprint depth along the track
    pub depth: f64,
    pub height: f64,
    /// Fraction of `height` the car must clear to jump over
    pub clearance_ratio: f64,
    /// Lateral push rate away from the blocker (units/s)
    pub push: f64,
    /// Lateral velocity kept on impact
    pub lateral_damping: f64,
    /// Track fraction knocked back per contact tick
    pub progress_kick: f64,
    /// Reverse deceleration applied on contact (units/s²)
    pub reverse: f64,
}

impl BlockerTuning {
    fn obstacle() -> Self {
        Self {
            width: 1.6,
            depth: 1.6,
            height: 1.4,
            clearance_ratio: 0.6,
            push: 1.4,
            lateral_damping: 0.2,
            progress_kick: 0.0015,
            reverse: 14.0,
        }
    }

    fn tree() -> Self {
        Self {
            width: 1.2,
            depth: 1.2,
            height: 6.0,
            clearance_ratio: 0.6,
            push: 1.8,
            lateral_damping: 0.3,
            progress_kick: 0.002,
            reverse: 16.0,
        }
    }

    /// Jump height above which the car sails over
    pub fn clearance(&self) -> f64 {
        self.height * self.clearance_ratio
    }
}

impl Default for BlockerTuning {
    fn default() -> Self {
        Self::obstacle()
    }
}

/// Ramp geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RampTuning {
    pub front_width: f64,
    pub back_width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Default for RampTuning {
    fn default() -> Self {
        Self {
            front_width: 4.0,
            back_width: 3.2,
            depth: 8.0,
            height: 1.6,
        }
    }
}

/// Turbo pad footprint and boost
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurboTuning {
    pub width: f64,
    pub depth: f64,
    pub boost_speed: f64,
    /// Seconds the boost holds after entering the pad
    pub duration: f64,
}

impl Default for TurboTuning {
    fn default() -> Self {
        Self {
            width: 3.0,
            depth: 4.0,
            boost_speed: 70.0,
            duration: 1.2,
        }
    }
}

/// Trampoline footprint and launch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrampolineTuning {
    pub width: f64,
    pub depth: f64,
    /// Upward velocity set on launch
    pub launch_velocity: f64,
    /// Jump height above which entering the pad does not launch
    pub airborne_threshold: f64,
}

impl Default for TrampolineTuning {
    fn default() -> Self {
        Self {
            width: 3.0,
            depth: 3.0,
            launch_velocity: 18.0,
            airborne_threshold: 0.3,
        }
    }
}

/// Lava and mud surface zones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTuning {
    pub lava_width: f64,
    pub lava_depth: f64,
    /// Jump height above which lava is harmless
    pub lava_safe_height: f64,
    pub mud_width: f64,
    pub mud_depth: f64,
    /// Speed cap while in mud
    pub mud_max_speed: f64,
    /// Lateral velocity kept per frame in mud
    pub mud_lateral_damping: f64,
    /// Jump height above which mud has no grip effect
    pub mud_airborne_threshold: f64,
}

impl Default for ZoneTuning {
    fn default() -> Self {
        Self {
            lava_width: 3.0,
            lava_depth: 6.0,
            lava_safe_height: 0.5,
            mud_width: 4.0,
            mud_depth: 10.0,
            mud_max_speed: 18.0,
            mud_lateral_damping: 0.85,
            mud_airborne_threshold: 0.5,
        }
    }
}

/// Pickup footprints and the star's invincibility window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    pub collectible_size: f64,
    pub star_size: f64,
    /// Seconds of invincibility granted by the star
    pub star_duration: f64,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            collectible_size: 1.2,
            star_size: 1.6,
            star_duration: 6.0,
        }
    }
}

/// Per-kind hazard constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    pub obstacle: BlockerTuning,
    pub tree: BlockerTuning,
    pub ramp: RampTuning,
    pub turbo: TurboTuning,
    pub trampoline: TrampolineTuning,
    pub zones: ZoneTuning,
    pub pickups: PickupTuning,
    /// Distance from a checkpoint's centreline point that counts as passing it
    pub checkpoint_radius: f64,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            obstacle: BlockerTuning::obstacle(),
            tree: BlockerTuning::tree(),
            ramp: RampTuning::default(),
            turbo: TurboTuning::default(),
            trampoline: TrampolineTuning::default(),
            zones: ZoneTuning::default(),
            pickups: PickupTuning::default(),
            checkpoint_radius: 5.0,
        }
    }
}

/// Complete tuning set for one race
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,
    pub physics: PhysicsTuning,
    pub car: CarTuning,
    pub hazards: HazardTuning,
}

impl Tuning {
    /// Tuning with a difficulty preset applied on top of the defaults
    pub fn preset(difficulty: Difficulty) -> Self {
        let mut tuning = Self::default();
        tuning.apply_preset(difficulty);
        tuning
    }

    /// Apply a difficulty preset (scales speed-related constants)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        let previous = self.difficulty;
        let speed = difficulty.speed_scale() / previous.speed_scale();
        let curve = difficulty.curve_scale() / previous.curve_scale();

        self.difficulty = difficulty;
        self.physics.accel *= speed;
        self.physics.max_speed *= speed;
        self.physics.max_reverse *= speed;
        self.physics.curve_force *= curve;
        self.hazards.turbo.boost_speed *= speed;
    }

    /// Parse a tuning document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning ({})", tuning.difficulty.as_str());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would break the integrator's clamps
    pub fn validate(&self) -> Result<(), TuningError> {
        let p = &self.physics;
        if p.max_speed <= 0.0 || p.max_reverse < 0.0 {
            return Err(TuningError::Invalid("speed caps must be positive"));
        }
        if p.max_delta <= 0.0 {
            return Err(TuningError::Invalid("max_delta must be positive"));
        }
        if !(0.0..=1.0).contains(&p.drag) || !(0.0..=1.0).contains(&p.edge_slowdown) {
            return Err(TuningError::Invalid("per-frame factors must lie in [0, 1]"));
        }
        if p.speed_to_progress <= 0.0 {
            return Err(TuningError::Invalid("speed_to_progress must be positive"));
        }
        if self.car.half_x <= 0.0 || self.car.half_z <= 0.0 {
            return Err(TuningError::Invalid("car extents must be positive"));
        }
        Ok(())
    }
}
