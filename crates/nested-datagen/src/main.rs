//! CLI for deterministic nested data generation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nested_datagen::DatasetConfig;
use nested_random::{NestedRandom, SeedPath};
use rand::Rng;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nested-datagen")]
#[command(about = "Deterministic nested data generation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate user records as JSON lines
    Generate {
        /// JSON config file; command-line flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Root seed
        #[arg(short, long, allow_hyphen_values = true)]
        seed: Option<i32>,

        /// Number of records
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quiet mode (no progress output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the derived seed of a path and samples from its generator
    Seed {
        /// Path such as /users/5/name
        path: String,

        /// Root seed
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        seed: i32,

        /// Number of u64 samples to print
        #[arg(long, default_value = "0")]
        samples: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Generate {
            config,
            seed,
            count,
            output,
            quiet,
        } => {
            let mut config = match config {
                Some(path) => DatasetConfig::from_file(&path)?,
                None => DatasetConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(count) = count {
                config.count = count;
            }
            generate(&config, output, quiet)
        }
        Command::Seed {
            path,
            seed,
            samples,
        } => show_seed(&path, seed, samples),
    }
}

fn generate(config: &DatasetConfig, output: Option<PathBuf>, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!("Generating {} records", config.count);
        if let Some(path) = &output {
            eprintln!("Output: {:?}", path);
        }
        eprintln!("Seed: {}", config.seed);
    }

    let start_time = Instant::now();
    let last_print = AtomicU64::new(0);

    let progress_fn = |current: usize, total: usize| {
        let elapsed = start_time.elapsed().as_secs();
        let last = last_print.load(Ordering::Relaxed);

        // Print at most every second
        if elapsed > last {
            last_print.store(elapsed, Ordering::Relaxed);
            let pct = (current as f64 / total as f64) * 100.0;
            let rate = current as f64 / elapsed.max(1) as f64;
            eprint!(
                "\rProgress: {:.1}% ({}/{}) - {:.0} rows/sec    ",
                pct, current, total, rate
            );
        }
    };

    let progress: Option<&(dyn Fn(usize, usize) + Sync)> =
        if quiet { None } else { Some(&progress_fn) };

    let count = match &output {
        Some(path) => nested_datagen::write_jsonl_file(path, config, progress)?,
        None => nested_datagen::write_jsonl(io::stdout().lock(), config, progress)?,
    };

    if !quiet {
        let elapsed = start_time.elapsed();
        eprintln!();
        eprintln!(
            "Generated {} records in {:.2}s",
            count,
            elapsed.as_secs_f64()
        );
    }

    Ok(())
}

fn show_seed(path: &str, seed: i32, samples: usize) -> Result<()> {
    let path: SeedPath = path
        .parse()
        .with_context(|| format!("Invalid path: {}", path))?;
    let node = NestedRandom::from_path(seed, &path);

    println!("node: {}", node);
    println!("seed: {}", node.derive_seed());

    let mut rng = node.random_generator();
    for _ in 0..samples {
        println!("{}", rng.gen::<u64>());
    }

    Ok(())
}
