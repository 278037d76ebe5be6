//! Vehicle integration
//!
//! Advances the car one tick in track space: longitudinal speed, lateral
//! slide with curvature pull, progress along the curve, then vertical
//! motion over ramps and in free fall. Everything is clamped, nothing fails.

use glam::DVec3;

use super::hazard::HazardField;
use super::state::{Pose, RaceEvent, VehicleState};
use super::tick::TickInput;
use super::track::TrackCurve;
use crate::consts::REFERENCE_HZ;
use crate::tuning::{PhysicsTuning, Tuning};
use crate::{frame_decay, yaw_of};

/// Largest |lateral| the car centre may reach on this track
#[inline]
pub fn lateral_limit(track: &TrackCurve, physics: &PhysicsTuning) -> f64 {
    (track.half_width() - physics.lateral_margin).max(0.0)
}

/// Advance the vehicle by `delta` seconds
pub fn integrate(
    state: &mut VehicleState,
    input: &TickInput,
    track: &TrackCurve,
    hazards: &HazardField,
    tuning: &Tuning,
    delta: f64,
    events: &mut Vec<RaceEvent>,
) {
    let physics = &tuning.physics;

    step_timers(state, delta);
    step_longitudinal(state, input, physics, delta);
    step_lateral(state, input, track, physics, delta);
    step_progress(state, physics, delta);
    step_vertical(state, hazards, tuning, delta, events);
    apply_edge_penalty(state, track, physics, delta);

    let wheel_radius = tuning.car.wheel_radius.max(tuning.car.wheel_spin_min_radius);
    state.wheel_spin += state.speed * delta / wheel_radius;
}

fn step_timers(state: &mut VehicleState, delta: f64) {
    state.star_remaining = (state.star_remaining - delta).max(0.0);
}

/// Turbo overrides everything; otherwise throttle, reverse or coast
fn step_longitudinal(state: &mut VehicleState, input: &TickInput, physics: &PhysicsTuning, delta: f64) {
    if state.turbo_active() {
        state.turbo_remaining = (state.turbo_remaining - delta).max(0.0);
        state.speed = state.turbo_speed;
    } else if input.throttle && !input.reverse {
        state.speed = (state.speed + physics.accel * delta).min(physics.max_speed);
    } else if input.reverse {
        state.speed = (state.speed - physics.reverse_accel * delta).max(-physics.max_reverse);
    } else {
        state.speed *= frame_decay(physics.drag, delta);
    }
}

fn step_lateral(
    state: &mut VehicleState,
    input: &TickInput,
    track: &TrackCurve,
    physics: &PhysicsTuning,
    delta: f64,
) {
    if state.speed.abs() > physics.steer_speed_threshold {
        if input.steer_left {
            state.lateral_velocity -= physics.steer_force * delta;
        }
        if input.steer_right {
            state.lateral_velocity += physics.steer_force * delta;
        }
    } else {
        state.lateral_velocity *= frame_decay(physics.idle_lateral_decay, delta);
    }

    // Bends pull the car toward the outside, harder the faster it goes
    let curvature = track.curvature_at(state.progress);
    state.lateral_velocity +=
        curvature * state.speed * state.speed * physics.curve_force * delta * REFERENCE_HZ;

    state.lateral_velocity *= (1.0 - physics.drift_drag * delta).max(0.0);
    state.lateral += state.lateral_velocity * delta;
    state.clamp_lateral(lateral_limit(track, physics));
}

fn step_progress(state: &mut VehicleState, physics: &PhysicsTuning, delta: f64) {
    state.progress = (state.progress + state.speed * delta * physics.speed_to_progress).clamp(0.0, 1.0);
    // Dead stop at the end of the track
    if state.progress >= 1.0 && state.speed > 0.0 {
        state.speed = 0.0;
    }
}

/// Ramp support, lip kick and free fall
fn step_vertical(
    state: &mut VehicleState,
    hazards: &HazardField,
    tuning: &Tuning,
    delta: f64,
    events: &mut Vec<RaceEvent>,
) {
    let physics = &tuning.physics;

    let mut ramp_contact = false;
    let mut lift: f64 = 0.0;
    let mut kicker = None;
    for ramp in hazards.ramps() {
        let Some(contact) = ramp.ramp_contact(state.progress, state.lateral, tuning.car.half_x) else {
            continue;
        };
        ramp_contact = true;
        lift = lift.max(contact.height);
        if contact.fraction > physics.ramp_launch_fraction && state.speed > physics.ramp_jump_speed_min {
            kicker.get_or_insert(ramp.id);
        }
    }

    // Riding the surface unless something already threw the car higher
    let supported = lift > 0.0 && state.jump_height <= lift;

    if let Some(id) = kicker.filter(|_| !state.ramp_jumped) {
        let boost = state.speed.abs() * physics.ramp_jump_boost_speed_factor + physics.ramp_jump_boost_base;
        state.jump_velocity = state.jump_velocity.max(boost);
        state.ramp_jumped = true;
        state.ramp_just_launched = true;
        log::debug!("Ramp #{id} kick: {boost:.1} up at speed {:.1}", state.speed);
        events.push(RaceEvent::RampLaunched { hazard: id });
    }

    if supported {
        state.jump_height = lift;
        state.jump_velocity = state.jump_velocity.max(0.0);
    } else {
        state.jump_velocity += physics.gravity * delta;
        state.jump_height += state.jump_velocity * delta;
        // Landing on a ramp face
        if lift > 0.0 && state.jump_height < lift {
            state.jump_height = lift;
            state.jump_velocity = state.jump_velocity.max(0.0);
        }
    }

    if state.jump_height <= 0.0 {
        state.jump_height = 0.0;
        state.jump_velocity = 0.0;
    }

    if !ramp_contact && state.jump_height == 0.0 {
        state.ramp_jumped = false;
    }
}

/// Off-track friction while riding the edge
fn apply_edge_penalty(state: &mut VehicleState, track: &TrackCurve, physics: &PhysicsTuning, delta: f64) {
    if state.lateral.abs() > track.half_width() - physics.edge_margin {
        state.speed *= frame_decay(physics.edge_slowdown, delta);
    }
}

/// World-space pose for the renderer
pub fn pose(state: &VehicleState, track: &TrackCurve, tuning: &Tuning) -> Pose {
    let physics = &tuning.physics;
    let tangent = track.tangent_at(state.progress);
    let position = track.world_at(state.progress, state.lateral)
        + DVec3::Y * (tuning.car.base_y + state.jump_height);

    let slip = state
        .lateral_velocity
        .atan2(state.speed.abs().max(physics.slip_speed_floor));

    Pose {
        position,
        yaw: yaw_of(tangent) + slip * physics.slip_yaw_scale,
        wheel_spin: state.wheel_spin,
        airborne: state.airborne(),
    }
}
