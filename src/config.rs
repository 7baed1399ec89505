//! Hyperparameters for the PPO optimizer and the episode driver.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{PpoError, Result};

/// PPO hyperparameters.
///
/// Defaults reproduce the reference combat run: a 28-feature observation,
/// five discrete behaviours, a 1024-unit hidden layer and Adam at `2e-4`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PpoConfig {
    /// Observation length.
    pub state_dim: usize,
    /// Number of discrete actions.
    pub action_dim: usize,
    /// Width of the hidden layers.
    pub hidden_dim: usize,
    /// Adam learning rate.
    pub lr: f64,
    /// Adam moment decay coefficients `(β1, β2)`.
    pub betas: (f64, f64),
    /// Discount factor γ, in (0, 1).
    pub gamma: f64,
    /// Optimization passes over each rollout segment.
    pub k_epochs: usize,
    /// Clip range ε, in (0, 1).
    pub eps_clip: f64,
    /// Weight of the squared value error.
    pub value_coef: f64,
    /// Weight of the entropy bonus.
    pub entropy_coef: f64,
    /// Added to the return standard deviation during normalization.
    pub norm_eps: f64,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            state_dim: 28,
            action_dim: 5,
            hidden_dim: 1024,
            lr: 2e-4,
            betas: (0.9, 0.999),
            gamma: 0.99,
            k_epochs: 4,
            eps_clip: 0.2,
            value_coef: 0.5,
            entropy_coef: 0.01,
            norm_eps: 1e-5,
        }
    }
}

fn positive(field: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(PpoError::invalid(field, "must be positive"));
    }
    Ok(())
}

fn open_unit(field: &'static str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(PpoError::invalid(
            field,
            format!("must lie in (0, 1), got {value}"),
        ));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(PpoError::invalid(
            field,
            format!("must be finite and non-negative, got {value}"),
        ));
    }
    Ok(())
}

impl PpoConfig {
    /// Checks every hyperparameter; called before any network is built.
    pub fn validate(&self) -> Result<()> {
        positive("state_dim", self.state_dim)?;
        positive("action_dim", self.action_dim)?;
        positive("hidden_dim", self.hidden_dim)?;
        positive("k_epochs", self.k_epochs)?;

        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(PpoError::invalid(
                "lr",
                format!("must be finite and positive, got {}", self.lr),
            ));
        }
        let (beta1, beta2) = self.betas;
        for beta in [beta1, beta2] {
            if !(0.0..1.0).contains(&beta) {
                return Err(PpoError::invalid(
                    "betas",
                    format!("must lie in [0, 1), got {beta}"),
                ));
            }
        }

        open_unit("gamma", self.gamma)?;
        open_unit("eps_clip", self.eps_clip)?;
        non_negative("value_coef", self.value_coef)?;
        non_negative("entropy_coef", self.entropy_coef)?;

        if !(self.norm_eps.is_finite() && self.norm_eps > 0.0) {
            return Err(PpoError::invalid(
                "norm_eps",
                format!("must be finite and positive, got {}", self.norm_eps),
            ));
        }
        Ok(())
    }
}

/// Cadence and stopping rules for the episode driver.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrainerConfig {
    /// Upper bound on training episodes.
    pub max_episodes: usize,
    /// Steps after which an episode is cut off.
    pub max_timesteps: usize,
    /// Run a PPO update every this many environment steps.
    pub update_timestep: usize,
    /// Episodes between progress log lines.
    pub log_interval: usize,
    /// Stop once the windowed mean episode reward reaches this value.
    pub solved_reward: Option<f64>,
    /// Seeds libtorch and the environment for reproducible runs.
    pub seed: Option<i64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 10_000,
            max_timesteps: 3600,
            update_timestep: 300,
            log_interval: 20,
            solved_reward: Some(230.0),
            seed: None,
        }
    }
}

impl TrainerConfig {
    /// Rejects zero-valued cadences.
    pub fn validate(&self) -> Result<()> {
        positive("max_episodes", self.max_episodes)?;
        positive("max_timesteps", self.max_timesteps)?;
        positive("update_timestep", self.update_timestep)?;
        positive("log_interval", self.log_interval)?;
        Ok(())
    }
}
