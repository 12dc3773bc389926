use crate::agent::Agent;
use crate::chromosome::{mean_pairwise_distance, ActionSequence};
use crate::config::{ConfigError, GaConfig};
use crate::fitness::FitnessEvaluator;
use crate::physics::PhysicsState;
use crate::snapshot::{AgentRecord, SnapshotError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statistics for a single generation, taken just before it is replaced
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best_fitness: f32,
    pub avg_fitness: f32,
    pub worst_fitness: f32,
    /// Furthest x reached by any agent
    pub best_x: f32,
    pub reached_goal: usize,
    pub alive: usize,
    /// Mean pairwise Hamming distance between chromosomes
    pub avg_diversity: f32,
}

impl fmt::Display for GenerationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen {:>4} | Best: {:>6.3} | Avg: {:>6.3} | Worst: {:>6.3} | Best x: {:>7.1} | Goal: {} | Alive: {} | Diversity: {:.1}",
            self.generation,
            self.best_fitness,
            self.avg_fitness,
            self.worst_fitness,
            self.best_x,
            self.reached_goal,
            self.alive,
            self.avg_diversity,
        )
    }
}

/// Indices of the agents allowed to parent the next generation
#[derive(Clone, Debug, PartialEq)]
pub struct ParentPool {
    indices: Vec<usize>,
}

impl ParentPool {
    /// The top `fitness.len() / 2` indices by descending fitness.
    ///
    /// The sort is stable, so among equal scores the earlier agent ranks first.
    pub fn top_half(fitness: &[f32]) -> Self {
        let mut ranked: Vec<usize> = (0..fitness.len()).collect();
        ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        ranked.truncate(fitness.len() / 2);
        Self { indices: ranked }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Two independent uniform draws, with replacement
    pub fn draw_pair(&self, rng: &mut impl Rng) -> (usize, usize) {
        let n = self.indices.len();
        (
            self.indices[rng.gen_range(0..n)],
            self.indices[rng.gen_range(0..n)],
        )
    }
}

/// Single-point crossover.
///
/// With probability `rate` a cut point `k` is drawn from `[0, L-1]` and the
/// tails after `k` are swapped; otherwise the children are copies of the parents.
pub fn crossover(
    parent_a: &ActionSequence,
    parent_b: &ActionSequence,
    rate: f64,
    rng: &mut impl Rng,
) -> (ActionSequence, ActionSequence) {
    if parent_a.is_empty() || rng.gen::<f64>() >= rate {
        return (parent_a.clone(), parent_b.clone());
    }
    let point = rng.gen_range(0..parent_a.len());
    parent_a.splice(parent_b, point)
}

/// Per-position random resetting
pub fn mutate(chromosome: &ActionSequence, rate: f64, rng: &mut impl Rng) -> ActionSequence {
    chromosome.mutated(rate, rng)
}

/// One generation of agents plus the parameters that breed the next
pub struct Population {
    pub agents: Vec<Agent>,
    pub generation: u32,
    pub config: GaConfig,
    pub spawn: PhysicsState,
    pub best_fitness_history: Vec<f32>,
}

impl Population {
    /// Create a random population. Every chromosome is drawn uniformly.
    pub fn new(
        config: GaConfig,
        spawn: PhysicsState,
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let agents = (0..config.population_size)
            .map(|_| Agent::new(ActionSequence::random(config.sequence_length, rng), spawn))
            .collect();

        Ok(Self {
            agents,
            generation: 0,
            config,
            spawn,
            best_fitness_history: Vec::new(),
        })
    }

    /// Rebuild a population from exported records, keeping their chromosomes.
    /// Agents restart from `spawn`; the stored positions are informational.
    pub fn from_records(
        config: GaConfig,
        spawn: PhysicsState,
        records: &[AgentRecord],
    ) -> Result<Self, SnapshotError> {
        config.validate()?;
        if records.len() != config.population_size {
            return Err(SnapshotError::SizeMismatch {
                expected: config.population_size,
                found: records.len(),
            });
        }
        let mut agents = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.chromosome.len() != config.sequence_length {
                return Err(SnapshotError::LengthMismatch {
                    index,
                    expected: config.sequence_length,
                    found: record.chromosome.len(),
                });
            }
            agents.push(Agent::new(record.chromosome.clone(), spawn));
        }
        let generation = records.first().map_or(0, |r| r.generation);

        Ok(Self {
            agents,
            generation,
            config,
            spawn,
            best_fitness_history: Vec::new(),
        })
    }

    /// Export `{generation, chromosome, position}` for every agent, in order
    pub fn records(&self) -> Vec<AgentRecord> {
        self.agents
            .iter()
            .map(|agent| AgentRecord {
                generation: self.generation,
                chromosome: agent.chromosome.clone(),
                position: agent.physics.position,
            })
            .collect()
    }

    pub fn fitness(&self, evaluator: &FitnessEvaluator) -> Vec<f32> {
        self.agents.iter().map(|a| evaluator.evaluate(a)).collect()
    }

    /// Compute statistics for the current generation
    pub fn generation_stats(&self, evaluator: &FitnessEvaluator) -> GenerationStats {
        let fitnesses = self.fitness(evaluator);
        let best = fitnesses.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let worst = fitnesses.iter().cloned().fold(f32::INFINITY, f32::min);
        let avg = fitnesses.iter().sum::<f32>() / fitnesses.len().max(1) as f32;
        let best_x = self
            .agents
            .iter()
            .map(|a| a.physics.position.x)
            .fold(f32::NEG_INFINITY, f32::max);

        GenerationStats {
            generation: self.generation,
            best_fitness: best,
            avg_fitness: avg,
            worst_fitness: worst,
            best_x,
            reached_goal: self.agents.iter().filter(|a| evaluator.reached_goal(a)).count(),
            alive: self.agents.iter().filter(|a| a.alive).count(),
            avg_diversity: self.diversity(),
        }
    }

    /// Mean Hamming distance over all unordered chromosome pairs
    pub fn diversity(&self) -> f32 {
        mean_pairwise_distance(&self.agents)
    }

    /// Rank by fitness and draw two parents from the top half
    pub fn select_pair(
        &self,
        evaluator: &FitnessEvaluator,
        rng: &mut impl Rng,
    ) -> (&Agent, &Agent) {
        let pool = ParentPool::top_half(&self.fitness(evaluator));
        let (a, b) = pool.draw_pair(rng);
        (&self.agents[a], &self.agents[b])
    }

    /// Breed the next generation and replace the current one wholesale.
    ///
    /// Returns statistics from the generation that was replaced.
    pub fn evolve(&mut self, evaluator: &FitnessEvaluator, rng: &mut impl Rng) -> GenerationStats {
        let stats = self.generation_stats(evaluator);
        self.best_fitness_history.push(stats.best_fitness);

        let pool = ParentPool::top_half(&self.fitness(evaluator));
        let pairs = self.config.population_size / 2;
        let mut next_gen = Vec::with_capacity(pairs * 2);

        for _ in 0..pairs {
            let (a, b) = pool.draw_pair(rng);
            let (child_a, child_b) = crossover(
                &self.agents[a].chromosome,
                &self.agents[b].chromosome,
                self.config.crossover_rate,
                rng,
            );
            for child in [child_a, child_b] {
                let child = mutate(&child, self.config.mutation_rate, rng);
                next_gen.push(Agent::new(child, self.spawn));
            }
        }

        self.agents = next_gen;
        self.generation += 1;
        stats
    }

    /// Furthest-right agent, the one a viewer follows
    pub fn leader(&self) -> Option<&Agent> {
        self.agents
            .iter()
            .max_by(|a, b| a.physics.position.x.total_cmp(&b.physics.position.x))
    }
}
