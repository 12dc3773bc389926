use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete input an agent can issue in a tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    Idle,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Jump,
        Action::Idle,
    ];

    /// Uniform draw over every action
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::MoveLeft => "move_left",
            Action::MoveRight => "move_right",
            Action::Jump => "jump",
            Action::Idle => "idle",
        };
        f.write_str(name)
    }
}

/// A chromosome: the scripted action for every tick of an agent's run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSequence {
    actions: Vec<Action>,
}

impl ActionSequence {
    /// Draw `length` actions i.i.d. uniformly
    pub fn random(length: usize, rng: &mut impl Rng) -> Self {
        let actions = (0..length).map(|_| Action::random(rng)).collect();
        Self { actions }
    }

    /// A sequence repeating one action
    pub fn repeat(action: Action, length: usize) -> Self {
        Self {
            actions: vec![action; length],
        }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Action> {
        self.actions.get(index).copied()
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Single-point recombination at `point`.
    ///
    /// Returns `(self[..point] ++ other[point..], other[..point] ++ self[point..])`.
    /// Both parents must have the same length and `point <= len`.
    pub fn splice(&self, other: &ActionSequence, point: usize) -> (ActionSequence, ActionSequence) {
        debug_assert_eq!(self.len(), other.len());
        let first = self.actions[..point]
            .iter()
            .chain(&other.actions[point..])
            .copied()
            .collect();
        let second = other.actions[..point]
            .iter()
            .chain(&self.actions[point..])
            .copied()
            .collect();
        (Self { actions: first }, Self { actions: second })
    }

    /// Copy of this sequence where every position is independently redrawn
    /// with probability `rate`. A redraw may land on the same action.
    pub fn mutated(&self, rate: f64, rng: &mut impl Rng) -> ActionSequence {
        let actions = self
            .actions
            .iter()
            .map(|&action| {
                if rng.gen::<f64>() < rate {
                    Action::random(rng)
                } else {
                    action
                }
            })
            .collect();
        Self { actions }
    }

    /// Number of positions at which two sequences differ
    pub fn distance(&self, other: &ActionSequence) -> usize {
        self.actions
            .iter()
            .zip(&other.actions)
            .filter(|(a, b)| a != b)
            .count()
            + self.len().abs_diff(other.len())
    }
}

impl From<Vec<Action>> for ActionSequence {
    fn from(actions: Vec<Action>) -> Self {
        Self { actions }
    }
}

/// Anything that carries a chromosome
pub trait HasChromosome {
    fn chromosome(&self) -> &ActionSequence;
}

/// Mean Hamming distance over all unordered pairs; 0 for fewer than two carriers
pub fn mean_pairwise_distance<T: HasChromosome>(carriers: &[T]) -> f32 {
    let n = carriers.len();
    if n < 2 {
        return 0.0;
    }
    let mut total = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            total += carriers[i].chromosome().distance(carriers[j].chromosome());
        }
    }
    total as f32 / (n * (n - 1) / 2) as f32
}
