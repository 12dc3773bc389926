use crate::chromosome::{Action, ActionSequence, HasChromosome};
use crate::level::Level;
use crate::physics::{HasHitbox, PhysicsBody, PhysicsState, Rect};

/// One runner: a chromosome played back tick by tick through a physics body
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub chromosome: ActionSequence,
    /// Index of the next action to play; equals the chromosome length once exhausted
    pub cursor: usize,
    pub physics: PhysicsState,
    pub alive: bool,
}

impl Agent {
    /// A fresh agent in the `spawn` state with its cursor at the first action
    pub fn new(chromosome: ActionSequence, spawn: PhysicsState) -> Self {
        Self {
            chromosome,
            cursor: 0,
            physics: spawn,
            alive: true,
        }
    }

    /// The action the next tick will play. Past the end of the chromosome the agent idles.
    pub fn next_action(&self) -> Action {
        self.chromosome.get(self.cursor).unwrap_or(Action::Idle)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.chromosome.len()
    }

    /// Play one action. Dead agents do not move.
    pub fn tick(&mut self, body: &PhysicsBody, level: &Level) {
        if !self.alive {
            return;
        }

        let action = self.next_action();
        if !self.is_exhausted() {
            self.cursor += 1;
        }
        self.physics = body.step(&self.physics, action, &level.platforms);

        if let Some(kill_plane) = level.kill_plane {
            if self.physics.position.y > kill_plane {
                self.alive = false;
            }
        }
    }

    /// Put the agent back at the start of its run, keeping its chromosome
    pub fn reset(&mut self, spawn: PhysicsState) {
        self.cursor = 0;
        self.physics = spawn;
        self.alive = true;
    }
}

impl HasHitbox for Agent {
    fn hitbox(&self) -> Rect {
        self.physics.hitbox()
    }
}

impl HasChromosome for Agent {
    fn chromosome(&self) -> &ActionSequence {
        &self.chromosome
    }
}

/// Replay a chromosome from the level's spawn for `ticks` ticks.
///
/// Deterministic: the same chromosome, body and level always end in the same state.
pub fn replay(chromosome: &ActionSequence, body: &PhysicsBody, level: &Level, ticks: u32) -> Agent {
    let mut agent = Agent::new(chromosome.clone(), level.spawn_state());
    for _ in 0..ticks {
        agent.tick(body, level);
    }
    agent
}
