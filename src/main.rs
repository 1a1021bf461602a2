use ::rand as external_rand;
use clap::Parser;
use external_rand::rngs::StdRng;
use external_rand::SeedableRng;
use std::path::PathBuf;

use lightning::{Simulation, SimulationConfig};

#[cfg(feature = "ui")]
mod controls;
#[cfg(feature = "ui")]
mod visualization;

#[cfg(feature = "ui")]
use macroquad::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run without a window and dump the final frame
    #[arg(long)]
    headless: bool,

    /// Number of fixed simulation steps to run in headless mode
    #[arg(long, default_value_t = 600)]
    steps: u64,

    /// Seed for reproducible storms. Uses OS entropy if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file path (YAML or JSON). If not specified, searches for lightning.yaml, lightning.yml, or lightning.json in current directory.
    #[arg(short, long)]
    config: Option<String>,

    /// Write the final frame as JSON to this path (headless mode)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// The window setup runs before main in the viewer build, so this may be called twice
fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(not(feature = "ui"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Headless mode only
    init_logging();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    headless_main(&args, config)
}

#[cfg(feature = "ui")]
#[macroquad::main(window_conf)]
async fn main() {
    init_logging();
    let args = Args::parse();

    // Load configuration
    let config = match load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    if args.headless {
        if let Err(e) = headless_main(&args, config) {
            eprintln!("Error running headless mode: {}", e);
            std::process::exit(1);
        }
    } else if let Err(e) = ui_main(config, args.seed).await {
        eprintln!("Error running viewer: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file or use default
fn load_config(config_path: Option<&str>) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    if let Some(path) = config_path {
        // User specified a config file
        SimulationConfig::from_file(path)
            .map_err(|e| format!("Failed to load config from {}: {}", path, e).into())
    } else {
        // Try default paths
        let config = SimulationConfig::from_default_paths();
        config.validate()?;
        Ok(config)
    }
}

/// Headless mode - runs a fixed number of steps and reports the result
fn headless_main(args: &Args, config: SimulationConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = make_rng(args.seed);
    let mut sim = Simulation::with_config(config)?;

    for _ in 0..args.steps {
        sim.step(&mut rng);
    }

    let stats = sim.stats();
    println!(
        "step {}: {} roots, {} bolts, {} segments, {} sparks, deepest generation {}",
        stats.frame_index,
        stats.roots,
        stats.bolts,
        stats.segments,
        stats.particles,
        stats.deepest_generation
    );

    if let Some(path) = &args.output {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &sim.frame())?;
        log::info!("Frame written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "ui")]
async fn ui_main(config: SimulationConfig, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    use controls::handle_controls;
    use visualization::{draw_stats_and_help, ScreenRenderer};

    let mut rng = make_rng(seed);
    let mut sim = Simulation::with_config(config)?;
    let mut renderer = ScreenRenderer::new(1.0, true);

    loop {
        let outcome = handle_controls(&mut sim, &mut renderer, &mut rng);

        sim.advance(get_time() * 1000.0, &mut rng);

        clear_background(BLACK);
        sim.render(&mut renderer);

        let stats = sim.stats();
        draw_stats_and_help(&stats, sim.paused, sim.speed_multiplier, sim.clock.fps());

        if outcome.take_screenshot {
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            let filename = format!("lightning_screenshot_{}.png", timestamp);
            match capture_screenshot(&filename) {
                Ok(_) => log::info!("Screenshot saved: {}", filename),
                Err(e) => log::error!("Failed to save screenshot {}: {}", filename, e),
            }
        }

        next_frame().await;
    }
}

#[cfg(feature = "ui")]
fn window_conf() -> Conf {
    // Called by macroquad before main
    init_logging();
    let args = Args::parse();
    let (window_width, window_height) = window_size(args.config.as_deref());
    Conf {
        window_title: "Lightning".to_owned(),
        window_width,
        window_height,
        ..Default::default()
    }
}

/// Window size for the configured canvas. A config that fails to load falls
/// back to the default size here; main reports the error.
#[cfg(feature = "ui")]
fn window_size(config_path: Option<&str>) -> (i32, i32) {
    let config = load_config(config_path).unwrap_or_default();
    (config.canvas_width as i32, config.canvas_height as i32)
}

#[cfg(feature = "ui")]
/// Capture the current frame buffer as a PNG
fn capture_screenshot(filename: &str) -> Result<(), Box<dyn std::error::Error>> {
    let screen = get_screen_data();
    let width = u32::from(screen.width);
    let height = u32::from(screen.height);

    let img = image::RgbaImage::from_raw(width, height, screen.bytes)
        .ok_or("screen buffer does not match its reported size")?;
    // OpenGL reads rows bottom-up
    image::imageops::flip_vertical(&img).save(filename)?;
    Ok(())
}
