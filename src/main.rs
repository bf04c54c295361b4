//! Worldgen CLI - procedural fictional-world generator.
//!
//! Simulates plate tectonics, erosion, climate, and hydrology on a flat
//! grid, then writes a color PNG map and a structured JSON IR dump.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use worldgen::export::{write_ir, write_png};
use worldgen::{generate_with_progress, CancelToken, WorldGenError, WorldParams};

/// Generate plausible fictional worlds: tectonics, erosion, climate,
/// rivers, biomes.
#[derive(Parser)]
#[command(name = "worldgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Grid width in cells.
    #[arg(long, default_value = "1024")]
    width: u32,

    /// Grid height in cells.
    #[arg(long, default_value = "1024")]
    height: u32,

    /// Master seed; random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Target water fraction, [0.05, 0.95].
    #[arg(long, default_value = "0.6")]
    water: f32,

    /// Number of tectonic plates.
    #[arg(long, default_value = "12")]
    plates: u32,

    /// Global length scale for noise features and range widths.
    #[arg(long, default_value = "1.0")]
    scale: f32,

    /// PNG output path.
    #[arg(long, default_value = "world.png")]
    out_png: PathBuf,

    /// IR dump output path.
    #[arg(long, default_value = "world.json")]
    out_ir: PathBuf,

    /// Multiplier on evaporation and orographic gain.
    #[arg(long, default_value = "1.0")]
    rain_intensity: f32,

    /// Percentile of land flow accumulation that marks a river.
    #[arg(long, default_value = "0.98")]
    river_percentile: f32,

    /// Worker thread cap; defaults to the available cores.
    #[arg(long)]
    threads: Option<usize>,
}

/// Diagnostic verbosity, from the WORLDGEN_LOG environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum LogLevel {
    Off,
    Info,
    Debug,
}

fn log_level() -> LogLevel {
    match std::env::var("WORLDGEN_LOG").as_deref() {
        Ok("off") => LogLevel::Off,
        Ok("debug") => LogLevel::Debug,
        _ => LogLevel::Info,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("worldgen: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> Result<(), WorldGenError> {
    let log = log_level();

    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    let params = WorldParams {
        width: cli.width,
        height: cli.height,
        seed,
        water_frac: cli.water,
        plates: cli.plates,
        scale: cli.scale,
        rain_intensity: cli.rain_intensity,
        river_percentile: cli.river_percentile,
    };
    // Fail on bad flags before touching the thread pool or any file.
    params.validate()?;

    if let Some(threads) = cli.threads {
        if threads == 0 {
            return Err(WorldGenError::Config(
                "thread count must be positive".to_string(),
            ));
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| WorldGenError::Config(format!("thread pool: {e}")))?;
    }

    if log >= LogLevel::Info {
        eprintln!(
            "worldgen: {}x{} grid, seed {}, water {:.2}, {} plates",
            params.width, params.height, params.seed, params.water_frac, params.plates
        );
    }

    let start = Instant::now();
    let cancel = CancelToken::new();

    let world = generate_with_progress(
        params,
        &cancel,
        |name, i, total| {
            if log >= LogLevel::Debug {
                eprintln!("  [{}/{}] starting: {}", i + 1, total, name);
            }
        },
        |name, i, total| {
            if log >= LogLevel::Info {
                eprintln!("  [{}/{}] completed: {}", i + 1, total, name);
            }
        },
    )?;

    if log >= LogLevel::Info {
        eprintln!("worldgen: simulation finished in {:.2?}", start.elapsed());
    }

    let export_start = Instant::now();
    write_png(&world, &cli.out_png)?;
    write_ir(&world, &cli.out_ir)?;

    if log >= LogLevel::Info {
        eprintln!(
            "worldgen: wrote {} and {} in {:.2?}",
            cli.out_png.display(),
            cli.out_ir.display(),
            export_start.elapsed()
        );
    }

    Ok(())
}
