use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use platform_evolution::config::Config;
use platform_evolution::engine::GaEngine;
use platform_evolution::evolution::Population;
use platform_evolution::level::Level;
use platform_evolution::snapshot;

#[derive(Parser, Debug)]
#[command(
    name = "evolve",
    about = "Evolve platformer action sequences without a window"
)]
struct Cli {
    /// Config file path (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level file path (JSON array of platforms)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of generations to run
    #[arg(long, default_value = "50")]
    generations: u32,

    /// Append every finished generation to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Continue from the latest generation in the snapshot file
    #[arg(long, requires = "snapshot")]
    resume: bool,

    /// RNG seed, overriding the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Write the level geometry in use to this file and exit
    #[arg(long)]
    export_level: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    config.validate().context("invalid configuration")?;

    let level = match &cli.level {
        Some(path) => Level::load(path, Level::default().spawn)
            .with_context(|| format!("loading level from {}", path.display()))?,
        None => Level::default(),
    };

    if let Some(path) = &cli.export_level {
        level
            .save(path)
            .with_context(|| format!("writing level to {}", path.display()))?;
        println!("Wrote {} platforms to {}", level.platforms.len(), path.display());
        return Ok(());
    }

    let mut engine = match (&cli.snapshot, cli.resume) {
        (Some(path), true) => {
            let Some(records) = snapshot::load_latest(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?
            else {
                bail!("snapshot {} holds no generations to resume", path.display());
            };
            let population =
                Population::from_records(config.ga.clone(), level.spawn_state(), &records)
                    .context("snapshot does not fit the configured population")?;
            println!(
                "Resuming generation {} ({} agents) from {}",
                population.generation,
                population.agents.len(),
                path.display()
            );
            GaEngine::with_population(&config, level, population)?
        }
        _ => GaEngine::new(&config, level)?,
    };

    for _ in 0..cli.generations {
        let stats = engine.run_generation();
        println!("{stats}");
        if let Some(path) = &cli.snapshot {
            snapshot::append_records(path, engine.finished_records())
                .with_context(|| format!("writing snapshot {}", path.display()))?;
        }
    }

    if let Some(best) = engine
        .history()
        .iter()
        .max_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
    {
        println!(
            "Best: generation {} reached x = {:.1} (fitness {:.3})",
            best.generation, best.best_x, best.best_fitness
        );
    }
    Ok(())
}
