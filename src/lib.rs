//! Kart Rally - simulation core for an arcade kart racer
//!
//! Core modules:
//! - `sim`: Per-tick simulation (track curve, vehicle integration, hazards, race progress)
//! - `level`: Level descriptors, validation and procedural generation
//! - `tuning`: Data-driven physics and hazard balance
//!
//! Rendering, audio and input binding live outside this crate. They feed
//! [`sim::TickInput`] in and read [`sim::TickOutput`] back each frame.

pub mod level;
pub mod sim;
pub mod tuning;

pub use level::{LevelDescriptor, LevelError, load_level};
pub use tuning::{Difficulty, Tuning, TuningError};

use glam::DVec3;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the frame clock (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
    /// Largest delta a single tick will integrate (tab-suspend guard)
    pub const MAX_DELTA: f64 = 0.1;
    /// Reference frame rate that per-frame decay factors are expressed in
    pub const REFERENCE_HZ: f64 = 60.0;
    /// Metres/second to kilometres/hour
    pub const MS_TO_KMH: f64 = 3.6;
}

/// Normalize angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Heading of a direction on the ground plane, measured from +Z toward +X
#[inline]
pub fn yaw_of(dir: DVec3) -> f64 {
    dir.x.atan2(dir.z)
}

/// Apply a per-reference-frame multiplicative factor over `delta` seconds
///
/// A factor of 0.94 means "keep 94% every 1/60 s" regardless of frame rate.
#[inline]
pub fn frame_decay(factor: f64, delta: f64) -> f64 {
    factor.max(0.0).powf(delta * consts::REFERENCE_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-12);
        assert!((normalize_angle(-2.5 * PI) + 0.5 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_yaw_of_axes() {
        assert!(yaw_of(DVec3::Z).abs() < 1e-12);
        assert!((yaw_of(DVec3::X) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_decay_matches_reference_frame() {
        let one_frame = frame_decay(0.94, 1.0 / 60.0);
        assert!((one_frame - 0.94).abs() < 1e-12);
        let two_frames = frame_decay(0.94, 2.0 / 60.0);
        assert!((two_frames - 0.94 * 0.94).abs() < 1e-12);
        assert_eq!(frame_decay(0.5, 0.0), 1.0);
    }
}
