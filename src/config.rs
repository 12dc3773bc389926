use crate::fitness::NegativeFitness;
use crate::physics::{PhysicsParams, VerticalTieBreak};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A configuration value that would make the run undefined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("population size must be at least 2, got {0}")]
    PopulationTooSmall(usize),
    #[error("population size must be even so parents pair up, got {0}")]
    OddPopulationSize(usize),
    #[error("sequence length must be at least 1")]
    EmptySequence,
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
    #[error("goal_x must be a positive finite number, got {0}")]
    InvalidGoal(f32),
    #[error("generation_ticks must be at least 1")]
    ZeroGenerationTicks,
    #[error("physics.{name} must be a positive finite number, got {value}")]
    InvalidPhysics { name: &'static str, value: f32 },
    #[error("population was bred under a different [ga] configuration")]
    PopulationMismatch,
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Genetic algorithm parameters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GaConfig {
    pub population_size: usize,
    /// Per-position probability of redrawing an action
    pub mutation_rate: f64,
    /// Probability that a parent pair is recombined rather than copied
    pub crossover_rate: f64,
    pub sequence_length: usize,
    /// World x coordinate that counts as fitness 1.0
    pub goal_x: f32,
    pub negative_fitness: NegativeFitness,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            mutation_rate: 0.02,
            crossover_rate: 0.7,
            sequence_length: 300,
            goal_x: 1900.0,
            negative_fitness: NegativeFitness::Keep,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population_size));
        }
        if self.population_size % 2 != 0 {
            return Err(ConfigError::OddPopulationSize(self.population_size));
        }
        if self.sequence_length < 1 {
            return Err(ConfigError::EmptySequence);
        }
        check_rate("mutation_rate", self.mutation_rate)?;
        check_rate("crossover_rate", self.crossover_rate)?;
        if !(self.goal_x.is_finite() && self.goal_x > 0.0) {
            return Err(ConfigError::InvalidGoal(self.goal_x));
        }
        Ok(())
    }
}

/// Generation cadence and reproducibility
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Ticks simulated before each generation boundary
    pub generation_ticks: u32,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
    pub tie_break: VerticalTieBreak,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation_ticks: 300,
            seed: None,
            tie_break: VerticalTieBreak::Nearest,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ga: GaConfig,
    pub physics: PhysicsParams,
    pub simulation: SimulationConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ga.validate()?;
        if self.simulation.generation_ticks == 0 {
            return Err(ConfigError::ZeroGenerationTicks);
        }
        check_physics("gravity", self.physics.gravity)?;
        check_physics("jump_impulse", self.physics.jump_impulse)?;
        check_physics("move_speed", self.physics.move_speed)?;
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    // NaN fails the range check as well
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_physics(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPhysics { name, value })
    }
}
