use std::env;
use std::io;
use std::process;

use anyhow::Result;
use mtlab::{RunConfig, compare, write_json, write_text};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = match args.len() {
        1 => RunConfig::default(),
        2 => RunConfig::from_file(&args[1])?,
        _ => {
            println!("\nUsage: uniformity_test [config.toml]");
            println!("  config.toml - Seed, sample size, alpha and the parameter sets to compare");
            println!("  Without a file the built-in comparison (seed 42, n = 1000) is run");
            process::exit(1);
        }
    };
    config.validate()?;

    let seed = config.resolve_seed();
    info!(
        seed,
        sample_size = config.sample_size,
        alpha = config.alpha,
        sets = config.parameter_sets.len() + config.lcg.len(),
        "running uniformity comparison"
    );

    let comparisons = compare(&config, seed)?;

    let stdout = io::stdout();
    write_text(&mut stdout.lock(), &comparisons)?;

    if let Some(path) = &config.json_output {
        write_json(&comparisons, path)?;
        info!(path = %path.display(), "wrote json report");
    }

    Ok(())
}
