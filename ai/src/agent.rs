use rand::{Rng, rngs::SmallRng};
use tetris_core::tetris::{RandomSeed, getrandom};
use tetris_gym::Observation;

/// One environment step as seen by a learner.
#[derive(Debug)]
pub struct Transition<'a> {
    pub observation: &'a Observation,
    pub action: i64,
    pub reward: f64,
    pub next_observation: &'a Observation,
    pub done: bool,
}

/// Chooses actions and optionally learns from their outcome.
pub trait Agent {
    fn act(&mut self, observation: &Observation) -> i64;

    fn observe(&mut self, _transition: &Transition<'_>) {}
}

/// Picks uniformly among the action ids.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    actions: usize,
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(actions: usize, seed: Option<RandomSeed>) -> Self {
        Self {
            actions,
            rng: getrandom(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn act(&mut self, _observation: &Observation) -> i64 {
        self.rng.random_range(0..self.actions) as i64
    }
}
