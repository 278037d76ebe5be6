//! Kart Rally headless runner
//!
//! Drives one race with the autopilot at 60 Hz frames and prints a JSON
//! summary. See `kart-rally --help`.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::error::Error;
    use std::path::PathBuf;

    use clap::Parser;
    use serde::Serialize;

    use kart_rally::consts::SIM_DT;
    use kart_rally::sim::{FrameClock, Pose, Race, RaceEvent, autopilot, tick};
    use kart_rally::{Difficulty, LevelDescriptor, Tuning};

    #[derive(Debug, Parser)]
    #[command(name = "kart-rally", about = "Run one autopilot race headless and print a summary")]
    pub struct Args {
        /// Level JSON file (defaults to the standard course)
        pub level: Option<PathBuf>,

        /// Generate the level from this seed instead
        #[arg(short, long, conflicts_with = "level")]
        pub seed: Option<u64>,

        /// Race time limit in seconds
        #[arg(long, default_value = "120")]
        pub seconds: f64,

        /// casual, standard or expert
        #[arg(short, long, value_parser = parse_difficulty)]
        pub difficulty: Option<Difficulty>,

        /// Tuning JSON file applied before the difficulty preset
        #[arg(short, long)]
        pub tuning: Option<PathBuf>,

        /// Enable debug logging
        #[arg(short, long)]
        pub verbose: bool,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::parse(s).ok_or_else(|| format!("unknown difficulty: {s}"))
    }

    /// Printed at the end of the run
    #[derive(Debug, Serialize)]
    struct RunSummary {
        level: String,
        difficulty: &'static str,
        finished: bool,
        race_time: f64,
        finish_time: Option<f64>,
        checkpoints: String,
        collectibles: u32,
        collisions: u32,
        lava_restarts: u32,
        ticks: u64,
        speed_kmh: f64,
        pose: Pose,
    }

    pub fn run(args: Args) -> Result<(), Box<dyn Error>> {
        let level = match (&args.level, args.seed) {
            (Some(path), _) => LevelDescriptor::from_path(path)?,
            (None, Some(seed)) => LevelDescriptor::generate(seed),
            (None, None) => LevelDescriptor::standard(),
        };
        level.validate()?;

        let mut tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        if let Some(difficulty) = args.difficulty {
            tuning.apply_preset(difficulty);
        }

        let mut race = Race::new(&level, tuning);
        let mut clock = FrameClock::new();
        let frames = (args.seconds.max(0.0) / SIM_DT).ceil() as u64;

        let mut collisions = 0;
        let mut lava_restarts = 0;

        'frames: for _ in 0..frames {
            for _ in 0..clock.advance(SIM_DT) {
                let input = autopilot(&race);
                let output = tick(&mut race, &input, SIM_DT);

                for event in &output.events {
                    match event {
                        RaceEvent::Collision { .. } => collisions += 1,
                        RaceEvent::CheckpointReached { index } => {
                            log::info!("Checkpoint {} reached", index + 1);
                        }
                        other => log::debug!("{other:?}"),
                    }
                }

                if race.vehicle.lava_hit {
                    lava_restarts += 1;
                    log::warn!("Lava at t={:.3}, restarting", race.vehicle.progress);
                    race.restart();
                    clock.reset();
                    continue 'frames;
                }
                if race.is_finished() {
                    break 'frames;
                }
            }
        }

        log::debug!("{:.4}s of frame time left unsimulated", clock.pending());

        let summary = RunSummary {
            level: level.name.clone(),
            difficulty: race.tuning.difficulty.as_str(),
            finished: race.is_finished(),
            race_time: race.progress.elapsed(),
            finish_time: race.progress.finish_time(),
            checkpoints: race.progress.checkpoint_label(),
            collectibles: race.vehicle.collectible_count,
            collisions,
            lava_restarts,
            ticks: race.ticks,
            speed_kmh: race.vehicle.speed_kmh(),
            pose: race.pose(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use clap::Parser;

    let args = runner::Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    log::info!("Kart Rally (headless) starting...");

    runner::run(args).map_err(|e| {
        log::error!("{e}");
        e
    })
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on wasm; nothing to run here
}
