use crate::config::{Config, ConfigError};
use crate::evolution::{GenerationStats, Population};
use crate::fitness::FitnessEvaluator;
use crate::level::Level;
use crate::physics::{PhysicsBody, Rect};
use crate::snapshot::AgentRecord;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Where the engine is in its generational cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Ticks advance every live agent
    Simulating,
    /// Scoring and breeding; entered and left within a single `tick` call
    Evolving,
}

/// Drives one population through an endless simulate → evaluate → evolve loop.
///
/// The engine owns everything the loop touches: population, geometry, RNG and
/// tick counter. A caller only decides how often to call [`GaEngine::tick`].
pub struct GaEngine {
    population: Population,
    level: Level,
    /// Geometry waiting for the next generation boundary
    pending_platforms: Option<Vec<Rect>>,
    body: PhysicsBody,
    evaluator: FitnessEvaluator,
    generation_ticks: u32,
    tick: u32,
    phase: Phase,
    rng: StdRng,
    history: Vec<GenerationStats>,
    /// The last scored generation as it stood at its boundary
    finished: Vec<AgentRecord>,
}

impl GaEngine {
    /// Validate `config` and start from a random population
    pub fn new(config: &Config, level: Level) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = seeded_rng(config);
        let population = Population::new(config.ga.clone(), level.spawn_state(), &mut rng)?;
        Ok(Self::assemble(config, level, population, rng))
    }

    /// Continue from an existing population, e.g. one restored from a snapshot.
    /// The population must have been built from the same `[ga]` section as `config`.
    pub fn with_population(
        config: &Config,
        level: Level,
        mut population: Population,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if population.config != config.ga {
            return Err(ConfigError::PopulationMismatch);
        }
        let rng = seeded_rng(config);
        population.spawn = level.spawn_state();
        for agent in &mut population.agents {
            agent.reset(population.spawn);
        }
        Ok(Self::assemble(config, level, population, rng))
    }

    fn assemble(config: &Config, level: Level, population: Population, rng: StdRng) -> Self {
        info!(
            "Engine ready: {} agents, {} actions each, {} ticks per generation, {} platforms",
            population.agents.len(),
            population.config.sequence_length,
            config.simulation.generation_ticks,
            level.platforms.len()
        );
        Self {
            evaluator: FitnessEvaluator::new(config.ga.goal_x, config.ga.negative_fitness),
            body: PhysicsBody::new(config.physics, config.simulation.tie_break),
            generation_ticks: config.simulation.generation_ticks,
            population,
            level,
            pending_platforms: None,
            tick: 0,
            phase: Phase::Simulating,
            rng,
            history: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Advance every live agent by one action.
    ///
    /// Returns the statistics of the finished generation when this tick hit a
    /// generation boundary; the new generation is then already in place.
    pub fn tick(&mut self) -> Option<GenerationStats> {
        for agent in &mut self.population.agents {
            agent.tick(&self.body, &self.level);
        }
        self.tick += 1;

        if self.tick < self.generation_ticks {
            return None;
        }

        self.phase = Phase::Evolving;
        self.finished = self.population.records();
        let stats = self.population.evolve(&self.evaluator, &mut self.rng);
        info!("{}", stats);
        self.apply_pending_platforms();
        self.tick = 0;
        self.phase = Phase::Simulating;
        self.history.push(stats.clone());
        Some(stats)
    }

    /// Tick until the current generation ends
    pub fn run_generation(&mut self) -> GenerationStats {
        loop {
            if let Some(stats) = self.tick() {
                return stats;
            }
        }
    }

    /// Replace the level geometry from the next generation onwards.
    ///
    /// Agents mid-run keep the platforms they started with so their
    /// fitness is never judged against geometry that changed under them.
    pub fn set_platforms(&mut self, platforms: Vec<Rect>) {
        debug!(
            "Staged {} platforms for generation {}",
            platforms.len(),
            self.population.generation + 1
        );
        self.pending_platforms = Some(platforms);
    }

    fn apply_pending_platforms(&mut self) {
        let Some(platforms) = self.pending_platforms.take() else {
            return;
        };
        self.level.set_platforms(platforms);
        self.population.spawn = self.level.spawn_state();
        for agent in &mut self.population.agents {
            agent.reset(self.population.spawn);
        }
        info!(
            "Generation {} runs on {} platforms",
            self.population.generation,
            self.level.platforms.len()
        );
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticks elapsed in the current generation
    pub fn tick_in_generation(&self) -> u32 {
        self.tick
    }

    pub fn generation_ticks(&self) -> u32 {
        self.generation_ticks
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Chromosomes and final positions of the most recently scored generation
    pub fn finished_records(&self) -> &[AgentRecord] {
        &self.finished
    }
}

fn seeded_rng(config: &Config) -> StdRng {
    match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
