//! # VERDANT Headless
//!
//! Runs the streamed world for a fixed number of frames with a scripted
//! observer and prints what happened.
//!
//! ## Usage
//!
//! ```bash
//! # Stock world, observer walking right for ten seconds
//! ./verdant_headless --frames 600 --speed 300
//!
//! # Custom world, observer pacing around the origin
//! ./verdant_headless --config config/world.toml --seed 7 --oscillate 8000
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use verdant::{FrameDriver, ScriptedAnchor, TARGET_FRAME_TIME};
use verdant_core::Vec2;
use verdant_procedural::{World, WorldConfig, WorldResult};

/// Observer size used for the reported standing position.
const OBSERVER_SIZE: Vec2 = Vec2::new(40.0, 60.0);

#[derive(Parser, Debug)]
#[command(name = "verdant_headless")]
#[command(about = "Run the streamed 2D world without a renderer")]
struct Args {
    /// World configuration file (TOML); stock world if omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Frames to simulate
    #[arg(short, long, default_value = "3600")]
    frames: u64,

    /// Seconds per frame
    #[arg(long, default_value = "0.016666")]
    dt: f32,

    /// Observer speed in world units per second (negative walks left)
    #[arg(long, default_value = "300", allow_hyphen_values = true)]
    speed: f32,

    /// Pace between -N and N instead of walking forever
    #[arg(long)]
    oscillate: Option<f32>,
}

fn load_config(args: &Args) -> WorldResult<WorldConfig> {
    let config = match &args.config {
        Some(path) => WorldConfig::from_toml_file(path)?,
        None => WorldConfig::default(),
    };
    Ok(match args.seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    })
}

fn main() {
    let args = Args::parse();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    VERDANT HEADLESS v{}", env!("CARGO_PKG_VERSION"));
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            process::exit(1);
        }
    };

    println!("  Seed:      {}", config.seed.value());
    println!("  Mode:      {:?}", config.window.mode);
    println!("  Window:    ±{}", config.window.half_width);
    println!("  Lookahead: {}", config.lookahead());
    println!();

    let world = match World::new(config) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            process::exit(1);
        }
    };
    println!("🌱 Initial window: {} entities", world.scene().len());

    let anchor = ScriptedAnchor::from_speed(args.speed, args.oscillate);
    println!("🚶 Anchor: {:?}", anchor.script());
    println!("⏱  Running {} frames at dt = {}s ...", args.frames, args.dt);
    println!();

    let mut driver = FrameDriver::new(world, anchor, args.dt);
    let summary = driver.run(args.frames);
    let standing = driver.anchor().position(driver.world(), OBSERVER_SIZE);

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                             SUMMARY");
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Frames:          {}", summary.frames);
    println!("  Simulated:       {:.1}s", driver.world().elapsed());
    println!("  Anchor:          ({:.1}, {:.1})", standing.x, standing.y);
    println!("  Window:          [{}, {}]", summary.window.min_x, summary.window.max_x);
    println!("  Live entities:   {}", summary.entities);
    println!("  Window changes:  {}", summary.stats.window_changes);
    println!("  Columns grown:   {}", summary.stats.columns_generated);
    println!("  Evicted:         {}", summary.stats.evicted);
    println!("  Leaves landed:   {}", summary.stats.landings);
    println!("  Leaves reborn:   {}", summary.stats.respawns);
    println!("  Leaves recalled: {}", summary.stats.recalls);
    println!();
    println!(
        "  Frame time:      mean {}µs, max {}µs (budget {}µs)",
        summary.mean_frame.as_micros(),
        summary.max_frame.as_micros(),
        TARGET_FRAME_TIME.as_micros()
    );
    if summary.slow_frames > 0 {
        println!("  ⚠ {} frames over budget", summary.slow_frames);
    } else {
        println!("  ✓ Every frame within budget");
    }
}
