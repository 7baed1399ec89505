//! PPO training: loss terms, the optimizer, and the episode driver.

pub mod loss;
pub mod ppo;
pub mod trainer;


pub use ppo::{Ppo, UpdateStats};
pub use trainer::{EpisodeSummary, Trainer, TrainingReport};
