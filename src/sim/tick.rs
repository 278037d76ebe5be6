//! Per-frame simulation tick
//!
//! Core game loop step: integrate the car, resolve hazards, then advance
//! race progress. One call per rendered frame (or per fixed substep).

use serde::{Deserialize, Serialize};

use super::collision::{ResolveCtx, resolve_collisions};
use super::hazard::HazardField;
use super::integrator::{integrate, lateral_limit, pose};
use super::race::RaceProgress;
use super::state::{Pose, RaceEvent, VehicleState};
use super::track::TrackCurve;
use crate::level::{LevelDescriptor, load_level};
use crate::tuning::Tuning;

/// Driver input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub throttle: bool,
    pub reverse: bool,
    pub steer_left: bool,
    pub steer_right: bool,
}

/// What the renderer/audio layer gets back from a tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickOutput {
    pub pose: Pose,
    /// Events in the order they happened
    pub events: Vec<RaceEvent>,
    /// Delta actually integrated after clamping
    pub delta: f64,
}

/// Simulation context for one race on one level
///
/// Owns all mutable race state; the caller holds it and passes it to
/// [`tick`]. Discard it and build a new one on level change.
#[derive(Debug, Clone)]
pub struct Race {
    pub track: TrackCurve,
    pub hazards: HazardField,
    pub vehicle: VehicleState,
    pub progress: RaceProgress,
    pub tuning: Tuning,
    /// Ticks simulated since the last restart
    pub ticks: u64,
    pose: Pose,
}

impl Race {
    /// Build the track and hazards for `level` and line up at the start
    pub fn new(level: &LevelDescriptor, tuning: Tuning) -> Self {
        let (track, hazards) = load_level(level, &tuning.hazards);
        Self::from_parts(track, hazards, level.checkpoints.clone(), tuning)
    }

    pub fn from_parts(track: TrackCurve, hazards: HazardField, checkpoints: Vec<f64>, tuning: Tuning) -> Self {
        let progress = RaceProgress::new(checkpoints, tuning.hazards.checkpoint_radius);
        let vehicle = VehicleState::new();
        let pose = pose(&vehicle, &track, &tuning);
        Self {
            track,
            hazards,
            vehicle,
            progress,
            tuning,
            ticks: 0,
            pose,
        }
    }

    /// Reinitialize the car, race progress and hazard one-shots
    pub fn restart(&mut self) {
        self.vehicle = VehicleState::new();
        self.progress.reset();
        self.hazards.reset();
        self.ticks = 0;
        self.pose = pose(&self.vehicle, &self.track, &self.tuning);
        log::info!("Race restarted");
    }

    /// Acknowledge a lava hit so the latch can fire again
    pub fn clear_lava(&mut self) {
        self.vehicle.lava_hit = false;
    }

    /// Pose after the most recent tick
    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn is_finished(&self) -> bool {
        self.progress.is_finished()
    }

    /// Largest |lateral| the car can reach
    pub fn lateral_limit(&self) -> f64 {
        lateral_limit(&self.track, &self.tuning.physics)
    }
}

/// Clamp a frame delta into `[0, max]`
fn clamp_delta(delta: f64, max: f64) -> f64 {
    if !delta.is_finite() || delta <= 0.0 {
        return 0.0;
    }
    if delta > max {
        log::warn!("Clamping frame delta {delta:.3}s to {max:.3}s");
        return max;
    }
    delta
}

/// Advance the race by one tick of `delta` seconds
pub fn tick(race: &mut Race, input: &TickInput, delta: f64) -> TickOutput {
    let delta = clamp_delta(delta, race.tuning.physics.max_delta);
    let mut events = Vec::new();

    race.vehicle.clear_events();
    race.ticks += 1;

    // Finished: hold the pose until restart
    if race.progress.is_finished() {
        race.vehicle.freeze();
        race.pose = pose(&race.vehicle, &race.track, &race.tuning);
        return TickOutput {
            pose: race.pose,
            events,
            delta,
        };
    }

    let previous_progress = race.vehicle.progress;

    integrate(
        &mut race.vehicle,
        input,
        &race.track,
        &race.hazards,
        &race.tuning,
        delta,
        &mut events,
    );

    let ctx = ResolveCtx::new(&race.tuning, race.track.total(), delta);
    resolve_collisions(&mut race.hazards, &mut race.vehicle, &ctx, &mut events);
    // Bonk pushes may shove past the edge
    race.vehicle
        .clamp_lateral(lateral_limit(&race.track, &race.tuning.physics));

    race.progress.advance_clock(delta);
    race.progress
        .update(&race.track, previous_progress, &mut race.vehicle, &mut events);

    race.pose = pose(&race.vehicle, &race.track, &race.tuning);
    TickOutput {
        pose: race.pose,
        events,
        delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::level::{Placement, TrackSpec};
    use crate::sim::hazard::HazardKind;
    use crate::sim::race::RacePhase;
    use crate::sim::track::Wave;

    const THROTTLE: TickInput = TickInput {
        throttle: true,
        reverse: false,
        steer_left: false,
        steer_right: false,
    };

    fn flat_level() -> LevelDescriptor {
        let flat = Wave {
            amplitude: 0.0,
            frequency: 0.0,
        };
        LevelDescriptor {
            name: "flat".into(),
            track: TrackSpec {
                length: 400.0,
                segments: 100,
                half_width: 6.0,
                major: flat,
                minor: flat,
            },
            checkpoints: vec![0.25, 0.5, 0.75],
            ..Default::default()
        }
    }

    fn count(events: &[RaceEvent], f: impl Fn(&RaceEvent) -> bool) -> usize {
        events.iter().filter(|e| f(e)).count()
    }

    #[test]
    fn test_scenario_a_throttle_from_rest() {
        let mut race = Race::new(&flat_level(), Tuning::default());
        let max = race.tuning.physics.max_speed;
        let mut last = 0.0;
        // 1.5 s: not yet at the end of the track
        for _ in 0..90 {
            tick(&mut race, &THROTTLE, SIM_DT);
            assert!(race.vehicle.speed <= max);
            assert!(race.vehicle.speed >= last);
            last = race.vehicle.speed;
        }
        assert!(race.vehicle.speed > max * 0.6);
        assert!(race.vehicle.progress < 1.0);
    }

    #[test]
    fn test_scenario_b_turbo_pad() {
        let mut level = flat_level();
        level.turbo_pads.push(Placement { t: 0.41, lateral: 0.0 });
        let mut tuning = Tuning::default();
        // Pad exactly spans t ∈ [0.40, 0.42]
        tuning.hazards.turbo.depth = 0.02 * 400.0;
        let mut race = Race::new(&level, tuning);
        race.vehicle.progress = 0.36;
        race.vehicle.speed = 30.0;

        let boost = race.tuning.hazards.turbo.boost_speed;
        let duration = race.tuning.hazards.turbo.duration;
        let mut activations = 0;
        let mut boosted_time = 0.0;
        let mut expired = false;

        for _ in 0..600 {
            let out = tick(&mut race, &THROTTLE, SIM_DT);
            if race.vehicle.turbo_just_activated {
                activations += 1;
                assert_eq!(
                    count(&out.events, |e| matches!(e, RaceEvent::TurboActivated { .. })),
                    1
                );
            }
            if race.vehicle.speed == boost {
                boosted_time += out.delta;
            } else if boosted_time > 0.0 && !race.vehicle.turbo_active() {
                // Back to normal throttle integration
                assert!(race.vehicle.speed <= race.tuning.physics.max_speed);
                expired = true;
                break;
            }
        }

        assert_eq!(activations, 1);
        assert!(expired);
        // Boost holds for the pad's duration from entry, not from exit
        assert!(
            (boosted_time - duration).abs() <= SIM_DT + 1e-9,
            "boosted for {boosted_time}s"
        );
    }

    #[test]
    fn test_scenario_c_lava_and_star() {
        let mut level = flat_level();
        level.lava.push(Placement { t: 0.3, lateral: 0.0 });

        let mut race = Race::new(&level, Tuning::default());
        race.vehicle.progress = 0.3;
        let out = tick(&mut race, &TickInput::default(), SIM_DT);
        assert!(race.vehicle.lava_hit);
        assert_eq!(count(&out.events, |e| matches!(e, RaceEvent::LavaHit { .. })), 1);

        let mut starred = Race::new(&level, Tuning::default());
        starred.vehicle.progress = 0.3;
        starred.vehicle.star_remaining = 3.0;
        tick(&mut starred, &TickInput::default(), SIM_DT);
        assert!(!starred.vehicle.lava_hit);
    }

    #[test]
    fn test_scenario_d_finish_then_frozen() {
        let mut race = Race::new(&flat_level(), Tuning::default());
        let mut finish_tick = None;
        for i in 0..2000 {
            let out = tick(&mut race, &THROTTLE, SIM_DT);
            if out.events.iter().any(|e| matches!(e, RaceEvent::Finished { .. })) {
                finish_tick = Some(i);
                assert_eq!(race.vehicle.progress, 1.0);
                assert_eq!(race.progress.checkpoint_index(), 3);
                break;
            }
            assert!(race.vehicle.progress < 1.0);
        }
        assert!(finish_tick.is_some());
        assert_eq!(race.progress.phase(), RacePhase::Finished);
        let finish_pose = race.pose();

        for _ in 0..10 {
            let out = tick(&mut race, &THROTTLE, SIM_DT);
            assert_eq!(race.vehicle.speed, 0.0);
            assert_eq!(race.vehicle.lateral_velocity, 0.0);
            assert_eq!(race.vehicle.jump_velocity, 0.0);
            assert_eq!(out.pose.position, finish_pose.position);
            assert!(out.events.is_empty());
        }
        assert!(race.progress.finish_time().is_some());
    }

    #[test]
    fn test_scenario_e_stuck_without_checkpoints() {
        let mut level = flat_level();
        level.checkpoints = vec![0.25, 0.5, 0.75];
        let mut race = Race::new(&level, Tuning::default());
        // Skip straight past every checkpoint
        race.vehicle.progress = 0.9;

        let mut pinned = 0;
        for _ in 0..600 {
            tick(&mut race, &THROTTLE, SIM_DT);
            if race.vehicle.progress >= 1.0 {
                pinned += 1;
                assert!(race.vehicle.speed <= 0.0);
                assert_eq!(race.vehicle.progress, 1.0);
            }
        }
        assert!(pinned > 100);
        assert!(!race.is_finished());
        assert_eq!(race.progress.checkpoint_index(), 0);
    }

    #[test]
    fn test_collectible_fires_once_across_overlap() {
        let mut level = flat_level();
        level.collectibles.push(Placement { t: 0.2, lateral: 0.0 });
        let mut race = Race::new(&level, Tuning::default());
        race.vehicle.progress = 0.19;
        race.vehicle.speed = 10.0;

        let mut pickups = 0;
        for _ in 0..120 {
            let out = tick(&mut race, &TickInput::default(), SIM_DT);
            pickups += count(&out.events, |e| matches!(e, RaceEvent::Collected { .. }));
        }
        assert_eq!(pickups, 1);
        assert!(race.vehicle.collectible_collected);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut level = flat_level();
        level.collectibles.push(Placement { t: 0.05, lateral: 0.0 });
        level.trampolines.push(Placement { t: 0.1, lateral: 0.0 });
        let mut race = Race::new(&level, Tuning::default());

        for _ in 0..120 {
            tick(&mut race, &THROTTLE, SIM_DT);
        }
        assert!(race.vehicle.collectible_collected);
        assert_eq!(race.hazards.remaining_pickups(), 0);

        race.restart();
        assert_eq!(race.vehicle, VehicleState::new());
        assert_eq!(race.hazards.remaining_pickups(), 1);
        assert_eq!(race.progress.checkpoint_index(), 0);
        assert_eq!(race.ticks, 0);
        assert!(race.hazards.iter().all(|h| !matches!(
            h.kind,
            HazardKind::Trampoline { launched: true, .. }
        )));
    }

    #[test]
    fn test_obstacle_bonk_flags_and_clamps() {
        let mut level = flat_level();
        level.obstacles.push(Placement { t: 0.3, lateral: 0.0 });
        let mut race = Race::new(&level, Tuning::default());
        race.vehicle.progress = 0.3;
        race.vehicle.speed = 20.0;
        // Footprints overlap while |dx| < 2.0
        race.vehicle.lateral = 1.5;

        let out = tick(&mut race, &THROTTLE, SIM_DT);
        assert!(race.vehicle.collision_hit);
        assert!(race.vehicle.speed < 0.0);
        assert_eq!(count(&out.events, |e| matches!(e, RaceEvent::Collision { .. })), 1);

        // One-shot flag clears on the next tick once clear of the crate
        race.vehicle.lateral = -5.0;
        tick(&mut race, &TickInput::default(), SIM_DT);
        assert!(!race.vehicle.collision_hit);
        assert!(race.vehicle.lateral.abs() <= race.lateral_limit());
    }

    #[test]
    fn test_determinism() {
        // Same level, same inputs: identical runs
        let level = LevelDescriptor::standard();
        let mut a = Race::new(&level, Tuning::default());
        let mut b = Race::new(&level, Tuning::default());
        for i in 0..900u32 {
            let input = TickInput {
                throttle: i % 7 != 0,
                reverse: i % 97 == 0,
                steer_left: (i / 40) % 3 == 0,
                steer_right: (i / 40) % 3 == 1,
            };
            let out_a = tick(&mut a, &input, SIM_DT);
            let out_b = tick(&mut b, &input, SIM_DT);
            assert_eq!(out_a.pose, out_b.pose);
            assert_eq!(out_a.events, out_b.events);
        }
        assert_eq!(a.vehicle, b.vehicle);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut race = Race::new(&flat_level(), Tuning::default());
        let out = tick(&mut race, &THROTTLE, 5.0);
        assert_eq!(out.delta, race.tuning.physics.max_delta);
        let out = tick(&mut race, &THROTTLE, f64::NAN);
        assert_eq!(out.delta, 0.0);
        let out = tick(&mut race, &THROTTLE, -1.0);
        assert_eq!(out.delta, 0.0);
    }

    #[test]
    fn test_clear_lava_rearms_latch() {
        let mut level = flat_level();
        level.lava.push(Placement { t: 0.3, lateral: 0.0 });
        let mut race = Race::new(&level, Tuning::default());
        race.vehicle.progress = 0.3;
        tick(&mut race, &TickInput::default(), SIM_DT);
        let out = tick(&mut race, &TickInput::default(), SIM_DT);
        assert!(out.events.is_empty());
        race.clear_lava();
        let out = tick(&mut race, &TickInput::default(), SIM_DT);
        assert_eq!(count(&out.events, |e| matches!(e, RaceEvent::LavaHit { .. })), 1);
    }
}
