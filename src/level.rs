//! Level descriptors
//!
//! A level is plain data: the track generator parameters, the checkpoint
//! fractions and one placement list per hazard kind. [`load_level`] turns
//! it into the runtime [`TrackCurve`] and [`HazardField`].

use std::f64::consts::PI;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::hazard::{Hazard, HazardField, HazardKind};
use crate::sim::state::HazardId;
use crate::sim::track::{TrackCurve, Wave};
use crate::tuning::HazardTuning;

/// Smallest track-fraction gap between generated hazards
const MIN_HAZARD_GAP: f64 = 0.035;
/// Empty track kept in front of a generated ramp
const RAMP_RUN_UP: f64 = 0.06;
/// Generated hazards start after this fraction (clear start line)
const FIRST_HAZARD_T: f64 = 0.08;
/// ...and stop before this one (clear finish straight)
const LAST_HAZARD_T: f64 = 0.94;

/// Errors from loading or validating a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid track: {0}")]
    Track(&'static str),
    #[error("checkpoint {index} at {t} must be in [0, 1) and after the previous one")]
    Checkpoint { index: usize, t: f64 },
    #[error("{kind} #{index} at (t={t}, lateral={lateral}) is off the track")]
    Placement {
        kind: &'static str,
        index: usize,
        t: f64,
        lateral: f64,
    },
}

/// Track generator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSpec {
    pub length: f64,
    pub segments: usize,
    pub half_width: f64,
    pub major: Wave,
    pub minor: Wave,
}

impl Default for TrackSpec {
    fn default() -> Self {
        Self {
            length: 800.0,
            segments: 200,
            half_width: 6.0,
            major: Wave {
                amplitude: 12.0,
                frequency: PI * 4.0,
            },
            minor: Wave {
                amplitude: 6.0,
                frequency: PI * 1.5,
            },
        }
    }
}

impl TrackSpec {
    pub fn build(&self) -> TrackCurve {
        TrackCurve::build(self.length, self.segments, self.half_width, self.major, self.minor)
    }
}

/// Hazard anchor in track space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub t: f64,
    pub lateral: f64,
}

impl Placement {
    pub const fn new(t: f64, lateral: f64) -> Self {
        Self { t, lateral }
    }
}

/// Complete description of one level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDescriptor {
    pub name: String,
    pub track: TrackSpec,
    /// Strictly increasing fractions in [0, 1)
    pub checkpoints: Vec<f64>,
    pub obstacles: Vec<Placement>,
    pub trees: Vec<Placement>,
    pub ramps: Vec<Placement>,
    pub turbo_pads: Vec<Placement>,
    pub trampolines: Vec<Placement>,
    pub lava: Vec<Placement>,
    pub mud: Vec<Placement>,
    pub collectibles: Vec<Placement>,
    pub stars: Vec<Placement>,
}

impl LevelDescriptor {
    /// The stock track with its six crates and a full hazard course
    pub fn standard() -> Self {
        Self {
            name: "Standard".into(),
            track: TrackSpec::default(),
            checkpoints: vec![0.25, 0.5, 0.75],
            obstacles: vec![
                Placement::new(0.18, -2.2),
                Placement::new(0.32, 2.4),
                Placement::new(0.46, -1.8),
                Placement::new(0.58, 2.0),
                Placement::new(0.7, -2.6),
                Placement::new(0.84, 2.2),
            ],
            trees: vec![Placement::new(0.12, 4.8), Placement::new(0.62, -4.8)],
            ramps: vec![Placement::new(0.4, 0.0)],
            turbo_pads: vec![Placement::new(0.08, 0.0), Placement::new(0.54, -1.5)],
            trampolines: vec![Placement::new(0.66, 2.5)],
            lava: vec![Placement::new(0.77, 1.5)],
            mud: vec![Placement::new(0.28, -2.5)],
            collectibles: vec![Placement::new(0.22, 1.5), Placement::new(0.9, -1.0)],
            stars: vec![Placement::new(0.5, 0.0)],
        }
    }

    /// Build a level from a seed
    ///
    /// Same seed, same level. Hazards are spaced at least `MIN_HAZARD_GAP`
    /// apart and ramps get an empty run-up.
    pub fn generate(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let track = TrackSpec {
            length: rng.random_range(600.0..1000.0),
            segments: 200,
            half_width: 6.0,
            major: Wave {
                amplitude: rng.random_range(6.0..14.0),
                frequency: PI * rng.random_range(2.0..5.0),
            },
            minor: Wave {
                amplitude: rng.random_range(2.0..7.0),
                frequency: PI * rng.random_range(0.5..2.0),
            },
        };
        let lane = track.half_width - 1.5;

        let mut level = Self {
            name: format!("Generated #{seed}"),
            track,
            checkpoints: vec![0.25, 0.5, 0.75],
            ..Default::default()
        };

        let mut t = FIRST_HAZARD_T;
        while t < LAST_HAZARD_T {
            let roll = rng.random_range(0..100u32);
            let lateral = rng.random_range(-lane..=lane);
            match roll {
                0..30 => level.obstacles.push(Placement::new(t, lateral)),
                30..40 => level.trees.push(Placement::new(t, lateral.signum() * lane)),
                40..50 => {
                    // Slide forward so the previous hazard sits outside the run-up
                    t += RAMP_RUN_UP - MIN_HAZARD_GAP;
                    if t >= LAST_HAZARD_T {
                        break;
                    }
                    level.ramps.push(Placement::new(t, 0.0));
                }
                50..60 => level.turbo_pads.push(Placement::new(t, lateral)),
                60..67 => level.trampolines.push(Placement::new(t, lateral)),
                67..74 => level.lava.push(Placement::new(t, lateral)),
                74..82 => level.mud.push(Placement::new(t, lateral)),
                82..95 => level.collectibles.push(Placement::new(t, lateral)),
                _ => level.stars.push(Placement::new(t, lateral)),
            }
            t += MIN_HAZARD_GAP + rng.random_range(0.0..0.04);
        }

        log::debug!("Generated level from seed {seed}: {} hazards", level.hazard_count());
        level
    }

    /// Parse and validate a level document
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn hazard_count(&self) -> usize {
        self.placements().map(|(_, list)| list.len()).sum()
    }

    /// Placement lists in load order
    fn placements(&self) -> impl Iterator<Item = (&'static str, &[Placement])> {
        [
            ("obstacle", self.obstacles.as_slice()),
            ("tree", self.trees.as_slice()),
            ("ramp", self.ramps.as_slice()),
            ("turbo pad", self.turbo_pads.as_slice()),
            ("trampoline", self.trampolines.as_slice()),
            ("lava", self.lava.as_slice()),
            ("mud", self.mud.as_slice()),
            ("collectible", self.collectibles.as_slice()),
            ("star", self.stars.as_slice()),
        ]
        .into_iter()
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let track = &self.track;
        if !track.length.is_finite() || track.length <= 0.0 {
            return Err(LevelError::Track("length must be positive"));
        }
        if track.segments < 2 {
            return Err(LevelError::Track("need at least 2 segments"));
        }
        if !track.half_width.is_finite() || track.half_width <= 0.0 {
            return Err(LevelError::Track("half_width must be positive"));
        }

        let mut previous = f64::NEG_INFINITY;
        for (index, &t) in self.checkpoints.iter().enumerate() {
            if !(0.0..1.0).contains(&t) || t <= previous {
                return Err(LevelError::Checkpoint { index, t });
            }
            previous = t;
        }

        for (kind, list) in self.placements() {
            for (index, p) in list.iter().enumerate() {
                if !(0.0..=1.0).contains(&p.t) || !(p.lateral.abs() <= track.half_width) {
                    return Err(LevelError::Placement {
                        kind,
                        index,
                        t: p.t,
                        lateral: p.lateral,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Build the track and hazard field for a level
///
/// Hazard ids follow declaration order: obstacles, trees, ramps, turbo
/// pads, trampolines, lava, mud, collectibles, stars.
pub fn load_level(level: &LevelDescriptor, tuning: &HazardTuning) -> (TrackCurve, HazardField) {
    let track = level.track.build();
    let total = track.total();
    let along = |depth: f64| if total > 0.0 { depth * 0.5 / total } else { 0.0 };

    let mut hazards = Vec::with_capacity(level.hazard_count());
    let mut push = |list: &[Placement], width: f64, depth: f64, kind: HazardKind| {
        for p in list {
            let id = hazards.len() as HazardId;
            hazards.push(Hazard::new(id, p.t, p.lateral, width * 0.5, along(depth), kind.clone()));
        }
    };

    let obstacle = &tuning.obstacle;
    push(
        level.obstacles.as_slice(),
        obstacle.width,
        obstacle.depth,
        HazardKind::Obstacle {
            clearance: obstacle.clearance(),
        },
    );
    let tree = &tuning.tree;
    push(
        level.trees.as_slice(),
        tree.width,
        tree.depth,
        HazardKind::Tree {
            clearance: tree.clearance(),
        },
    );
    let ramp = &tuning.ramp;
    push(
        level.ramps.as_slice(),
        ramp.front_width.max(ramp.back_width),
        ramp.depth,
        HazardKind::Ramp {
            front_width: ramp.front_width,
            back_width: ramp.back_width,
            height: ramp.height,
        },
    );
    let turbo = &tuning.turbo;
    push(
        level.turbo_pads.as_slice(),
        turbo.width,
        turbo.depth,
        HazardKind::TurboPad {
            boost_speed: turbo.boost_speed,
            duration: turbo.duration,
            inside: false,
        },
    );
    let trampoline = &tuning.trampoline;
    push(
        level.trampolines.as_slice(),
        trampoline.width,
        trampoline.depth,
        HazardKind::Trampoline {
            launch_velocity: trampoline.launch_velocity,
            launched: false,
        },
    );
    let zones = &tuning.zones;
    push(level.lava.as_slice(), zones.lava_width, zones.lava_depth, HazardKind::LavaZone);
    push(
        level.mud.as_slice(),
        zones.mud_width,
        zones.mud_depth,
        HazardKind::MudZone {
            max_speed: zones.mud_max_speed,
        },
    );
    let pickups = &tuning.pickups;
    push(
        level.collectibles.as_slice(),
        pickups.collectible_size,
        pickups.collectible_size,
        HazardKind::Collectible { collected: false },
    );
    push(
        level.stars.as_slice(),
        pickups.star_size,
        pickups.star_size,
        HazardKind::StarItem {
            duration: pickups.star_duration,
            collected: false,
        },
    );

    log::info!(
        "Loaded level '{}': {:.0} units, {} hazards, {} checkpoints",
        level.name,
        total,
        hazards.len(),
        level.checkpoints.len()
    );
    (track, HazardField::new(hazards))
}
