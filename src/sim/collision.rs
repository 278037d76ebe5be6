//! Hazard collision resolution
//!
//! Every hazard is tested once per tick against the car's footprint and
//! applies its own response. There is no early exit and no precedence
//! between kinds: mud and an obstacle overlapping on the same tick both
//! apply, in declaration order.

use super::hazard::{Hazard, HazardField, HazardKind};
use super::state::{RaceEvent, VehicleState};
use crate::frame_decay;
use crate::tuning::{BlockerTuning, HazardTuning, Tuning};

/// Per-tick inputs shared by every hazard response
#[derive(Debug, Clone, Copy)]
pub struct ResolveCtx<'a> {
    pub hazards: &'a HazardTuning,
    /// Car half width across the track
    pub car_lateral_half: f64,
    /// Car half length as a fraction of track length
    pub car_progress_half: f64,
    pub delta: f64,
}

impl<'a> ResolveCtx<'a> {
    pub fn new(tuning: &'a Tuning, track_total: f64, delta: f64) -> Self {
        let car_progress_half = if track_total > 0.0 {
            tuning.car.half_z / track_total
        } else {
            0.0
        };
        Self {
            hazards: &tuning.hazards,
            car_lateral_half: tuning.car.half_x,
            car_progress_half,
            delta,
        }
    }
}

/// Test every hazard against the car and apply the responses
pub fn resolve_collisions(
    field: &mut HazardField,
    state: &mut VehicleState,
    ctx: &ResolveCtx,
    events: &mut Vec<RaceEvent>,
) {
    for hazard in field.iter_mut() {
        let overlapping = hazard.overlaps(
            state.progress,
            state.lateral,
            ctx.car_lateral_half,
            ctx.car_progress_half,
        );
        hazard.resolve(state, overlapping, ctx, events);
    }
}

impl Hazard {
    /// Apply this hazard's response
    ///
    /// Called every tick, overlapping or not, so edge-triggered kinds can
    /// re-arm when the car leaves their footprint.
    pub fn resolve(
        &mut self,
        state: &mut VehicleState,
        overlapping: bool,
        ctx: &ResolveCtx,
        events: &mut Vec<RaceEvent>,
    ) {
        let id = self.id;
        let anchor = self.lateral;
        let name = self.kind.name();
        let response = if matches!(self.kind, HazardKind::Tree { .. }) {
            &ctx.hazards.tree
        } else {
            &ctx.hazards.obstacle
        };

        match &mut self.kind {
            HazardKind::Obstacle { clearance } | HazardKind::Tree { clearance } => {
                if !overlapping || state.invincible() || state.jump_height > *clearance {
                    return;
                }
                bonk(state, anchor, response, ctx.delta);
                if !state.collision_hit {
                    log::debug!("Hit {name} #{id} at t={:.4}", state.progress);
                }
                state.collision_hit = true;
                events.push(RaceEvent::Collision { hazard: id });
            }

            // Ramps carry the car vertically; the integrator owns that contact
            HazardKind::Ramp { .. } => {}

            HazardKind::TurboPad {
                boost_speed,
                duration,
                inside,
            } => {
                if !overlapping {
                    *inside = false;
                    return;
                }
                if *inside {
                    return;
                }
                // Entering the pad (re)starts the full boost
                *inside = true;
                let was_active = state.turbo_active();
                state.turbo_remaining = *duration;
                state.turbo_speed = *boost_speed;
                if !was_active {
                    log::debug!("Turbo #{id} engaged for {duration:.2}s");
                    state.turbo_just_activated = true;
                    events.push(RaceEvent::TurboActivated { hazard: id });
                }
            }

            HazardKind::Trampoline {
                launch_velocity,
                launched,
            } => {
                if !overlapping {
                    *launched = false;
                    return;
                }
                if *launched {
                    return;
                }
                *launched = true;
                if state.jump_height <= ctx.hazards.trampoline.airborne_threshold {
                    log::debug!("Trampoline #{id} launch at {launch_velocity:.1}");
                    state.jump_velocity = *launch_velocity;
                    state.trampoline_just_launched = true;
                    events.push(RaceEvent::TrampolineLaunched { hazard: id });
                }
            }

            HazardKind::LavaZone => {
                if !overlapping
                    || state.invincible()
                    || state.lava_hit
                    || state.jump_height > ctx.hazards.zones.lava_safe_height
                {
                    return;
                }
                log::debug!("Lava #{id} at t={:.4}", state.progress);
                state.lava_hit = true;
                events.push(RaceEvent::LavaHit { hazard: id });
            }

            HazardKind::MudZone { max_speed } => {
                if !overlapping
                    || state.invincible()
                    || state.jump_height > ctx.hazards.zones.mud_airborne_threshold
                {
                    return;
                }
                let cap = max_speed.abs();
                state.speed = state.speed.clamp(-cap, cap);
                state.lateral_velocity *= frame_decay(ctx.hazards.zones.mud_lateral_damping, ctx.delta);
            }

            HazardKind::Collectible { collected } => {
                if !overlapping || *collected {
                    return;
                }
                *collected = true;
                state.collectible_collected = true;
                state.collectible_count += 1;
                log::debug!("Collected #{id} ({} total)", state.collectible_count);
                events.push(RaceEvent::Collected { hazard: id });
            }

            HazardKind::StarItem {
                duration,
                collected,
            } => {
                if !overlapping || *collected {
                    return;
                }
                *collected = true;
                state.star_remaining = *duration;
                log::debug!("Star #{id}: invincible for {duration:.1}s");
                events.push(RaceEvent::StarCollected { hazard: id });
            }
        }
    }
}

/// Head-on bump: shove sideways, kill lateral slide, knock back along the
/// track and start rolling backwards
fn bonk(state: &mut VehicleState, anchor: f64, response: &BlockerTuning, delta: f64) {
    let push_dir = if state.lateral - anchor < 0.0 { -1.0 } else { 1.0 };
    state.lateral += push_dir * response.push * delta;
    state.lateral_velocity *= response.lateral_damping;
    state.progress = (state.progress - response.progress_kick).max(0.0);
    state.speed = state.speed.min(0.0) - response.reverse * delta;
}
