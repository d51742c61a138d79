//! Hex Flight headless runner
//!
//! Drives the simulation without a renderer: an autopilot steers the craft,
//! scene events are counted instead of drawn, and the HUD is logged.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use glam::Vec2;

use hex_flight::sim::{FrameClock, GamePhase, GameWorld, SceneEvent, TickInput};
use hex_flight::{ConfigError, Settings};

#[derive(Debug, Parser)]
#[command(name = "hex-flight", about = "Run the hex-flight simulation headless")]
struct Args {
    /// JSON settings file (defaults are used for missing fields)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run seed; overrides the settings file
    #[arg(long)]
    seed: Option<u64>,
    /// Display frames to simulate
    #[arg(long, default_value_t = 60 * 120)]
    frames: u32,
    /// Display refresh rate fed to the frame clock
    #[arg(long, default_value_t = 60.0)]
    hz: f32,
    /// Use the narrow touch steering layout
    #[arg(long)]
    touch: bool,
    /// Start a new run after game over instead of stopping
    #[arg(long)]
    restart: bool,
    /// Print the final HUD as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("hex-flight: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let seed = args.seed.or(settings.seed).unwrap_or_else(clock_seed);
    log::info!("Hex Flight starting with seed {seed}");

    let mut world = GameWorld::new(seed, settings)?;
    let mut clock = FrameClock::new();
    let dt = 1.0 / args.hz.max(1.0);
    let mut tiles = 0usize;
    let mut spawned = 0usize;
    let mut runs = 0u32;

    for frame in 0..args.frames {
        let mut input = autopilot(&world, frame, args.touch);
        if world.state.phase != GamePhase::Running {
            if runs > 0 && !args.restart {
                break;
            }
            input.start = true;
        }

        let was_running = world.state.phase == GamePhase::Running;
        clock.advance(&mut world, &input, dt);
        if !was_running && world.state.phase == GamePhase::Running {
            runs += 1;
        }

        for event in world.drain_events() {
            match event {
                SceneEvent::TileAdded { .. } => tiles += 1,
                SceneEvent::EntityAdded { .. } => spawned += 1,
                _ => {}
            }
        }

        if frame % 600 == 0 {
            let hud = world.hud();
            log::info!(
                "frame {frame}: {:?} distance {} hp {} regen {:.1}%",
                hud.phase,
                hud.distance,
                hud.hit_points,
                hud.regen_percent
            );
        }
    }

    let hud = world.hud();
    log::info!(
        "Finished after {runs} run(s): {tiles} tiles streamed, {spawned} bodies spawned, {} live",
        world.entities.len()
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&hud)?);
    } else {
        println!(
            "{:?}: distance {}, hit points {}, regen {:.1}%",
            hud.phase, hud.distance, hud.hit_points, hud.regen_percent
        );
    }
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Weave vertically, ducking away from the nearest incoming asteroid
fn autopilot(world: &GameWorld, frame: u32, touch: bool) -> TickInput {
    let t = frame as f32 * 0.01;
    let mut pointer = Vec2::new((t * 0.7).sin() * 0.6, t.sin() * 0.8);

    if let Some(craft) = &world.craft {
        let threat = world
            .entities
            .iter()
            .filter(|e| e.is_flying() && e.kind.is_obstacle())
            .map(|e| e.world_bounds().center)
            .filter(|c| c.x > craft.position.x - 5.0)
            .min_by(|a, b| {
                a.distance_squared(craft.position)
                    .total_cmp(&b.distance_squared(craft.position))
            });
        if let Some(center) = threat {
            if center.distance(craft.position) < 40.0 {
                pointer.y = if center.y > craft.position.y { -1.0 } else { 1.1 };
            }
        }
    }

    TickInput {
        pointer,
        touch,
        start: false,
    }
}
