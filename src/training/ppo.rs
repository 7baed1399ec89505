//! PPO optimizer: rollout memory, current/old policy pair and the
//! clipped-surrogate update.
//!
//! Actions are sampled from the frozen old policy. Every [`Ppo::update`]
//! trains the current policy for `k_epochs` passes over the whole recorded
//! segment, then copies its weights into the old policy and clears memory.

use std::path::Path;

use tch::{nn, nn::OptimizerConfig, Device, Kind, Tensor};
use tracing::{debug, info, warn};

use super::loss::{
    advantages, approx_kl, clip_fraction, clipped_surrogate, importance_ratio, value_loss,
};
use crate::config::PpoConfig;
use crate::error::{PpoError, Result};
use crate::memory::Memory;
use crate::nn::{ActorCritic, ActorCriticPolicy};
use crate::returns::{discounted_returns, normalize};
use crate::transition::{PendingTransition, TransitionTracker};

/// Diagnostics from the final epoch of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStats {
    /// Transitions in the consumed segment.
    pub batch_size: usize,
    /// Epochs run.
    pub epochs: usize,
    /// Mean total loss.
    pub loss: f64,
    /// Mean clipped-surrogate loss.
    pub policy_loss: f64,
    /// Mean squared value error.
    pub value_loss: f64,
    /// Mean policy entropy.
    pub entropy: f64,
    /// Approximate KL divergence from the old policy.
    pub approx_kl: f64,
    /// Fraction of clipped ratios.
    pub clip_fraction: f64,
}

/// Recorded segment stacked into constant tensors.
struct Batch {
    observations: Tensor,
    actions: Tensor,
    old_log_probs: Tensor,
    returns: Tensor,
}

/// Proximal Policy Optimization over a single agent's rollouts.
pub struct Ppo<P: ActorCriticPolicy = ActorCritic> {
    config: PpoConfig,
    policy: P,
    policy_old: P,
    optimizer: nn::Optimizer,
    memory: Memory,
    tracker: TransitionTracker,
    device: Device,
}

impl Ppo<ActorCritic> {
    /// Builds the optimizer with two fresh [`ActorCritic`] networks.
    pub fn new(config: PpoConfig, device: Device) -> Result<Self> {
        config.validate()?;
        let policy = ActorCritic::new(
            config.state_dim,
            config.action_dim,
            config.hidden_dim,
            device,
        );
        let policy_old = ActorCritic::new(
            config.state_dim,
            config.action_dim,
            config.hidden_dim,
            device,
        );
        Self::from_policies(config, policy, policy_old)
    }
}

impl<P: ActorCriticPolicy> Ppo<P> {
    /// Builds the optimizer around two structurally identical policies.
    ///
    /// `policy_old` is frozen and overwritten with `policy`'s weights; the
    /// Adam optimizer only sees `policy`'s variables.
    pub fn from_policies(config: PpoConfig, policy: P, mut policy_old: P) -> Result<Self> {
        config.validate()?;
        for p in [&policy, &policy_old] {
            if p.state_dim() != config.state_dim {
                return Err(PpoError::invalid(
                    "state_dim",
                    format!("policy takes {}, config says {}", p.state_dim(), config.state_dim),
                ));
            }
            if p.action_dim() != config.action_dim {
                return Err(PpoError::invalid(
                    "action_dim",
                    format!(
                        "policy has {}, config says {}",
                        p.action_dim(),
                        config.action_dim
                    ),
                ));
            }
        }

        policy_old.var_store_mut().freeze();
        policy_old.load_snapshot(&policy.snapshot())?;

        let (beta1, beta2) = config.betas;
        let optimizer = nn::Adam {
            beta1,
            beta2,
            ..Default::default()
        }
        .build(policy.var_store(), config.lr)?;
        let device = policy.var_store().device();

        Ok(Self {
            config,
            policy,
            policy_old,
            optimizer,
            memory: Memory::new(),
            tracker: TransitionTracker::default(),
            device,
        })
    }

    /// Hyperparameters the optimizer was built with.
    pub fn config(&self) -> &PpoConfig {
        &self.config
    }

    /// The trainable policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The frozen policy used for sampling.
    pub fn policy_old(&self) -> &P {
        &self.policy_old
    }

    /// Transitions recorded since the last successful update.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Whether an action has been proposed and is waiting for its outcome.
    pub fn has_pending_action(&self) -> bool {
        self.tracker.is_pending()
    }

    /// Drops recorded transitions and any pending proposal.
    pub fn clear_memory(&mut self) {
        self.memory.clear();
        self.tracker.discard();
    }

    /// Proposes an action for `observation` by sampling the old policy.
    ///
    /// The outcome of the action must be reported with
    /// [`Ppo::record_outcome`] before the next proposal.
    pub fn select_action(&mut self, observation: &[f64]) -> Result<usize> {
        if self.tracker.is_pending() {
            return Err(PpoError::UnrecordedAction);
        }
        if observation.len() != self.config.state_dim {
            return Err(PpoError::ObservationShape {
                expected: self.config.state_dim,
                actual: observation.len(),
            });
        }

        let obs: Vec<f32> = observation.iter().map(|&x| x as f32).collect();
        let obs = Tensor::from_slice(&obs).to_device(self.device);
        let (action, logprob) = self.policy_old.act(&obs)?;

        self.tracker.propose(PendingTransition {
            observation: observation.to_vec(),
            action,
            logprob,
        })?;
        Ok(action)
    }

    /// Completes the proposed transition with the environment's response.
    pub fn record_outcome(&mut self, reward: f64, terminal: bool) -> Result<()> {
        self.tracker.complete(&mut self.memory, reward, terminal)
    }

    /// Runs one PPO update over everything recorded since the last update.
    ///
    /// Returns `Ok(None)` without touching any state when memory is empty.
    /// On success the old policy equals the current one and memory is
    /// cleared. On error memory is kept for inspection.
    pub fn update(&mut self) -> Result<Option<UpdateStats>> {
        if self.tracker.is_pending() {
            return Err(PpoError::UnrecordedAction);
        }
        if self.memory.is_empty() {
            return Ok(None);
        }
        self.memory
            .validate(self.config.state_dim, self.config.action_dim)?;

        let returns = discounted_returns(
            self.memory.rewards(),
            self.memory.terminals(),
            self.config.gamma,
        );
        let returns = normalize(&returns, self.config.norm_eps);
        let batch = self.batch(&returns);

        let mut stats = None;
        for epoch in 0..self.config.k_epochs {
            let eval = self.policy.evaluate(&batch.observations, &batch.actions);

            let ratio = importance_ratio(&eval.log_probs, &batch.old_log_probs);
            let adv = advantages(&batch.returns, &eval.values);
            let surrogate = clipped_surrogate(&ratio, &adv, self.config.eps_clip);
            let value_err = value_loss(&eval.values, &batch.returns);

            let loss = (&surrogate + self.config.value_coef * &value_err
                - self.config.entropy_coef * &eval.entropy)
                .mean(Kind::Float);

            let loss_val = loss.f_double_value(&[])?;
            if !loss_val.is_finite() {
                warn!(epoch, loss = loss_val, "aborting update on non-finite loss");
                return Err(PpoError::NonFiniteLoss { epoch });
            }

            self.optimizer.zero_grad();
            loss.backward();
            self.optimizer.step();

            let epoch_stats = UpdateStats {
                batch_size: self.memory.len(),
                epochs: epoch + 1,
                loss: loss_val,
                policy_loss: mean_of(&surrogate),
                value_loss: mean_of(&value_err),
                entropy: mean_of(&eval.entropy),
                approx_kl: approx_kl(&eval.log_probs, &batch.old_log_probs),
                clip_fraction: clip_fraction(&ratio, self.config.eps_clip),
            };
            debug!(
                epoch,
                loss = epoch_stats.loss,
                policy_loss = epoch_stats.policy_loss,
                value_loss = epoch_stats.value_loss,
                entropy = epoch_stats.entropy,
                "ppo epoch"
            );
            stats = Some(epoch_stats);
        }

        self.sync_old_policy()?;
        self.memory.clear();

        if let Some(s) = &stats {
            info!(
                batch_size = s.batch_size,
                loss = s.loss,
                approx_kl = s.approx_kl,
                clip_fraction = s.clip_fraction,
                "ppo update"
            );
        }
        Ok(stats)
    }

    /// Copies the current policy's weights into the old policy.
    fn sync_old_policy(&mut self) -> Result<()> {
        let snapshot = self.policy.snapshot();
        self.policy_old.load_snapshot(&snapshot)
    }

    /// Seeds the current policy from a saved var store and resynchronizes the
    /// old policy from it.
    pub fn load_policy<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.policy
            .var_store_mut()
            .load(path)
            .map_err(|e| PpoError::Checkpoint {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.sync_old_policy()?;
        info!(path = %path.display(), "loaded policy checkpoint");
        Ok(())
    }

    /// Saves the current policy's var store.
    pub fn save_policy<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.policy
            .var_store()
            .save(path)
            .map_err(|e| PpoError::Checkpoint {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn batch(&self, returns: &[f64]) -> Batch {
        let n = self.memory.len() as i64;
        let observations: Vec<f32> = self
            .memory
            .observations()
            .iter()
            .flatten()
            .map(|&x| x as f32)
            .collect();
        let actions: Vec<i64> = self.memory.actions().iter().map(|&a| a as i64).collect();
        let old_log_probs: Vec<f32> = self.memory.logprobs().iter().map(|&x| x as f32).collect();
        let returns: Vec<f32> = returns.iter().map(|&x| x as f32).collect();

        Batch {
            observations: Tensor::from_slice(&observations)
                .reshape([n, self.config.state_dim as i64])
                .to_device(self.device),
            actions: Tensor::from_slice(&actions).to_device(self.device),
            old_log_probs: Tensor::from_slice(&old_log_probs).to_device(self.device),
            returns: Tensor::from_slice(&returns).to_device(self.device),
        }
    }
}

fn mean_of(t: &Tensor) -> f64 {
    t.mean(Kind::Float).f_double_value(&[]).unwrap_or(f64::NAN)
}
