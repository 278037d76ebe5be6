//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Track-space state only (progress, lateral, height)
//! - Seeded RNG only, at level generation
//! - Stable iteration order (hazards by id)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod hazard;
pub mod integrator;
pub mod race;
pub mod state;
pub mod tick;
pub mod track;

pub use autopilot::autopilot;
pub use clock::FrameClock;
pub use collision::{ResolveCtx, resolve_collisions};
pub use hazard::{Hazard, HazardField, HazardKind, RampContact};
pub use integrator::{integrate, lateral_limit, pose};
pub use race::{RacePhase, RaceProgress};
pub use state::{HazardId, Pose, RaceEvent, VehicleState};
pub use tick::{Race, TickInput, TickOutput, tick};
pub use track::{TrackCurve, Wave};
