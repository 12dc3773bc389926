use crate::agent::Agent;
use serde::{Deserialize, Serialize};

/// How a negative raw score (agent left of x = 0) is treated when ranking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeFitness {
    #[default]
    Keep,
    FloorAtZero,
}

/// Scores an agent by how far along the level it ended up.
///
/// Fitness is `x / goal_x` for the hitbox's left edge. It is not bounded:
/// overshooting the goal gives more than 1, ending left of the origin gives a
/// negative value unless the policy floors it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitnessEvaluator {
    pub goal_x: f32,
    pub negative: NegativeFitness,
}

impl FitnessEvaluator {
    pub fn new(goal_x: f32, negative: NegativeFitness) -> Self {
        Self { goal_x, negative }
    }

    pub fn evaluate(&self, agent: &Agent) -> f32 {
        self.score_x(agent.physics.position.x)
    }

    pub fn score_x(&self, x: f32) -> f32 {
        let raw = x / self.goal_x;
        match self.negative {
            NegativeFitness::Keep => raw,
            NegativeFitness::FloorAtZero => raw.max(0.0),
        }
    }

    /// True once the agent's left edge has reached the goal line
    pub fn reached_goal(&self, agent: &Agent) -> bool {
        agent.physics.position.x >= self.goal_x
    }
}
