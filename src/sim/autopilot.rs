//! Autopilot driver
//!
//! Drives the car for demos and the headless runner: full throttle, steer
//! around the nearest threat ahead, otherwise line up with the next
//! pickup or turbo pad.

use super::hazard::Hazard;
use super::tick::{Race, TickInput};

/// How far ahead (track fraction) the autopilot looks
const LOOKAHEAD: f64 = 0.05;
/// Extra gap kept beside a threat
const CLEARANCE_MARGIN: f64 = 0.8;
/// Lateral error ignored when steering
const DEAD_BAND: f64 = 0.35;
/// Seconds of lateral velocity folded into the steering error
const STEER_LEAD: f64 = 0.3;

/// Pick the input for the next tick
pub fn autopilot(race: &Race) -> TickInput {
    let vehicle = &race.vehicle;
    let limit = race.lateral_limit();
    let car_half = race.tuning.car.half_x;

    let ahead = race.hazards.ahead(vehicle.progress, LOOKAHEAD);
    let threat = ahead.iter().find(|h| {
        h.kind.is_threat() && (vehicle.lateral - h.lateral).abs() < car_half + h.lateral_half + CLEARANCE_MARGIN
    });

    let target = match threat {
        Some(threat) => dodge_lane(threat, vehicle.lateral, car_half, limit),
        None => ahead
            .iter()
            .find(|h| h.kind.is_bonus())
            .map_or(vehicle.lateral * 0.5, |bonus| bonus.lateral),
    }
    .clamp(-limit, limit);

    let error = target - (vehicle.lateral + vehicle.lateral_velocity * STEER_LEAD);
    TickInput {
        throttle: true,
        reverse: false,
        steer_left: error < -DEAD_BAND,
        steer_right: error > DEAD_BAND,
    }
}

/// Closest lane that clears `threat` and stays on the track
fn dodge_lane(threat: &Hazard, lateral: f64, car_half: f64, limit: f64) -> f64 {
    let offset = threat.lateral_half + car_half + CLEARANCE_MARGIN;
    let left = threat.lateral - offset;
    let right = threat.lateral + offset;

    match (left >= -limit, right <= limit) {
        (true, true) if (left - lateral).abs() <= (right - lateral).abs() => left,
        (true, true) => right,
        (true, false) => left,
        (false, true) => right,
        // Wider than the track: squeeze past on the roomier side
        (false, false) if threat.lateral >= 0.0 => -limit,
        (false, false) => limit,
    }
}
