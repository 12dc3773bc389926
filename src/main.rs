use anyhow::Context;
use clap::Parser;
use macroquad::prelude::{
    clear_background, draw_text, is_key_pressed, next_frame, screen_height, screen_width, Conf,
    KeyCode, BLACK, GREEN, ORANGE, SKYBLUE, WHITE, YELLOW,
};
use platform_evolution::config::Config;
use platform_evolution::engine::GaEngine;
use platform_evolution::evolution::GenerationStats;
use platform_evolution::level::Level;
use platform_evolution::render::{self, Camera, SCREEN_HEIGHT, SCREEN_WIDTH};
use platform_evolution::snapshot;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "platform-evolution",
    about = "Watch a population learn to run a platformer level"
)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON level file; the built-in arena otherwise
    #[arg(short, long)]
    level: Option<PathBuf>,

    /// Append every finished generation to this snapshot file
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Override the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Platform Evolution".to_string(),
        window_width: SCREEN_WIDTH as i32,
        window_height: SCREEN_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

fn load(args: &Args) -> anyhow::Result<(Config, Level)> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    if args.seed.is_some() {
        config.simulation.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;

    let level = match &args.level {
        Some(path) => {
            let spawn = Level::default().spawn;
            Level::load(path, spawn)
                .with_context(|| format!("loading level from {}", path.display()))?
        }
        None => Level::default(),
    };
    Ok((config, level))
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let (config, level) = match load(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{e:#}");
            return;
        }
    };
    let mut engine = match GaEngine::new(&config, level.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    let mut camera = Camera::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut show_stats = false;
    let speed_levels: [u32; 5] = [1, 2, 4, 8, 16];
    let mut speed_index: usize = 0;

    loop {
        let sw = screen_width();
        let sh = screen_height();

        if is_key_pressed(KeyCode::Tab) {
            show_stats = !show_stats;
        }
        if is_key_pressed(KeyCode::Up) && speed_index < speed_levels.len() - 1 {
            speed_index += 1;
        }
        if is_key_pressed(KeyCode::Down) && speed_index > 0 {
            speed_index -= 1;
        }
        if is_key_pressed(KeyCode::R) {
            match GaEngine::new(&config, level.clone()) {
                Ok(fresh) => {
                    log::info!("Restarted from a fresh population");
                    engine = fresh;
                }
                Err(e) => log::error!("{e}"),
            }
        }
        let sim_speed = speed_levels[speed_index];

        for _ in 0..sim_speed {
            if let Some(stats) = engine.tick() {
                println!("{stats}");
                if let Some(path) = &args.snapshot {
                    if let Err(e) = snapshot::append_records(path, engine.finished_records()) {
                        log::warn!("Failed to write snapshot: {e}");
                    }
                }
            }
        }

        if show_stats {
            draw_stats(engine.history(), sw, sh);
        } else {
            let population = engine.population();
            let leader = population.leader();
            if let Some(leader) = leader {
                camera.follow(leader, engine.level().bounds());
            }
            render::draw_world(
                &camera,
                engine.level(),
                &population.agents,
                leader,
                engine.evaluator().goal_x,
            );
            render::draw_hud(
                population.generation,
                engine.history().last().map(|s| s.best_fitness),
                engine.tick_in_generation(),
                engine.generation_ticks(),
                sim_speed,
            );
            render::draw_help(sh);
        }

        next_frame().await;
    }
}

fn draw_stats(history: &[GenerationStats], sw: f32, sh: f32) {
    clear_background(BLACK);
    draw_text("Platform Evolution", 250.0, 40.0, 30.0, WHITE);

    if let Some(stats) = history.last() {
        draw_text(&format!("Generation: {}", stats.generation + 1), 50.0, 80.0, 20.0, WHITE);
        draw_text(&format!("Best Fitness: {:.3}", stats.best_fitness), 50.0, 105.0, 20.0, GREEN);
        draw_text(&format!("Avg Fitness:  {:.3}", stats.avg_fitness), 50.0, 130.0, 20.0, SKYBLUE);
        draw_text(&format!("Diversity:    {:.1}", stats.avg_diversity), 50.0, 155.0, 20.0, ORANGE);
        draw_text(
            &format!("Reached goal: {}  Alive: {}", stats.reached_goal, stats.alive),
            50.0,
            180.0,
            20.0,
            YELLOW,
        );
    } else {
        draw_text("Evolving generation 1...", 50.0, 80.0, 20.0, YELLOW);
    }

    render::draw_fitness_graph(history, sw, sh);
    draw_text("TAB: world view  UP/DOWN: speed  R: restart", 10.0, sh - 10.0, 16.0, WHITE);
}
