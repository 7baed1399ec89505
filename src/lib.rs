//! duel_ppo - on-policy PPO training for an agent in a two-team combat arena.
//!
//! The rollout memory, return computation and act/record protocol are plain
//! Rust and always available. The policy networks and the optimizer use
//! libtorch through `tch` and sit behind the `nn` feature flag.

pub mod config;
pub mod environment;
pub mod error;
pub mod memory;
pub mod returns;
pub mod transition;

#[cfg(feature = "nn")]
pub mod nn;
#[cfg(feature = "nn")]
pub mod training;

pub use config::{PpoConfig, TrainerConfig};
pub use environment::{
    CombatEnvironment, Controller, JointAction, Outcome, RandomController, StepResult,
};
pub use error::{PpoError, Result};
pub use memory::Memory;
pub use transition::{PendingTransition, TransitionTracker};

#[cfg(feature = "nn")]
pub use nn::{ActorCritic, ActorCriticPolicy, ParameterSnapshot};
#[cfg(feature = "nn")]
pub use training::{Ppo, Trainer, UpdateStats};
