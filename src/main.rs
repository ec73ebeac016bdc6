//! evsim - CLI entry point
//!
//! Headless runner for the evolutionary agent simulation.

use clap::{Parser, Subcommand};
use evsim::{benchmark, Config, World};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evsim")]
#[command(version)]
#[command(about = "Evolutionary agent simulator with per-agent neural network brains")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "12000")]
        ticks: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write the per-day statistics history to this JSON file
        #[arg(long)]
        stats_out: Option<PathBuf>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1200")]
        ticks: u64,

        /// Population size
        #[arg(short, long, default_value = "200")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            seed,
            stats_out,
            quiet,
        } => run_simulation(config, ticks, seed, stats_out, quiet),

        Commands::Benchmark { ticks, population } => {
            init_logging("warn");
            run_benchmark(ticks, population)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_simulation(
    config_path: PathBuf,
    ticks: u64,
    seed: Option<u64>,
    stats_out: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    let level = if quiet { "warn" } else { config.logging.log_level.as_str() };
    init_logging(level);

    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }

    let mut world = match seed {
        Some(s) => World::new_with_seed(config.clone(), s)?,
        None => World::new(config.clone())?,
    };

    log::info!(
        "Starting simulation: {} ticks, {} ticks per day, seed {}",
        ticks,
        world.clock().ticks_per_day(),
        world.seed()
    );

    let start = Instant::now();
    let stats_interval = config.logging.stats_interval.max(1);

    for i in 0..ticks {
        world.tick();

        if !quiet && (i + 1) % stats_interval == 0 {
            println!("{}", world.stats().summary());
        }

        if world.is_extinct() {
            println!("\nPopulation extinct at tick {}", i + 1);
            break;
        }
    }

    let elapsed = start.elapsed();
    let stats = world.stats();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Ticks: {}", stats.tick);
    println!("Speed: {:.1} ticks/s", stats.tick as f64 / elapsed.as_secs_f64());
    println!("Days: {}", stats.day);
    println!("Final population: {}", stats.population);
    println!("Peak population: {}", stats.population_peak);
    println!("Births: {}", stats.total_births);
    println!("Deaths: {}", stats.total_deaths);
    println!("Families: {}", stats.family_count);

    let population = world.population();
    if let Some(oldest) = population.iter().max_by_key(|v| v.age) {
        println!(
            "Oldest: #{} {} ({} days, {}, on {})",
            oldest.id,
            oldest.family_name,
            oldest.age,
            oldest.activity_name(),
            oldest.terrain.name()
        );
    }

    if !quiet {
        let series = world.stats_history().population_series();
        if !series.is_empty() {
            println!("\nPopulation by day:");
            for (day, count) in series {
                println!("  day {:>4}: {}", day, count);
            }
        }
    }

    if let Some(path) = stats_out {
        world.stats_history().save(&path)?;
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn run_benchmark(ticks: u64, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== evsim Benchmark ===");
    println!("Ticks: {}", ticks);
    println!("Population: {}", population);
    println!();

    let result = benchmark(ticks, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    log::info!("Configuration saved to {:?}", output);
    Ok(())
}
