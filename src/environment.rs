//! Contracts for the combat simulation and the opposing controller.
//!
//! Neither is implemented here for real: the arena simulation and the
//! opponent's state machine live outside this crate. [`RandomController`]
//! is a uniform baseline opponent.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Actions submitted together for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointAction {
    /// Action of the agent being trained.
    pub own: usize,
    /// Action of the opposing controller.
    pub opponent: usize,
}

/// Final result of an episode from the trained agent's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Observation after the step.
    pub observation: Vec<f64>,
    /// Reward for the trained agent.
    pub reward: f64,
    /// Whether the episode ended on this step.
    pub done: bool,
    /// Set once the episode has a decided result.
    pub outcome: Option<Outcome>,
}

/// A two-team combat simulation.
pub trait CombatEnvironment {
    /// Starts a new episode and returns the first observation.
    fn reset(&mut self) -> Vec<f64>;

    /// Advances one tick with both teams' actions.
    fn step(&mut self, action: JointAction) -> StepResult;

    /// Reseeds any internal randomness. Deterministic simulations ignore it.
    fn seed(&mut self, _seed: u64) {}
}

/// Decision logic for the opposing team.
pub trait Controller {
    /// Chooses an action for the current observation and global timestep.
    fn act(&mut self, observation: &[f64], timestep: usize) -> usize;

    /// Human-readable name, used in logs.
    fn name(&self) -> &str;
}

/// Uniformly random opponent.
#[derive(Debug)]
pub struct RandomController {
    action_dim: usize,
    rng: StdRng,
}

impl RandomController {
    /// Creates a seeded random controller over `0..action_dim`.
    pub fn new(action_dim: usize, seed: u64) -> Self {
        Self {
            action_dim,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Controller for RandomController {
    fn act(&mut self, _observation: &[f64], _timestep: usize) -> usize {
        self.rng.gen_range(0..self.action_dim)
    }

    fn name(&self) -> &str {
        "random"
    }
}
