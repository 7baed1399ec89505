//! Actor-critic policy contract and parameter snapshots.

use std::collections::BTreeMap;

use tch::{nn::VarStore, Tensor};

use super::distribution::ActionSampler;
use crate::error::{PpoError, Result};

/// Output of [`ActorCriticPolicy::evaluate`] for a batch.
pub struct Evaluation {
    /// Log-probability of each taken action, `[N]`.
    pub log_probs: Tensor,
    /// State-value estimates, `[N]`.
    pub values: Tensor,
    /// Entropy of each action distribution, `[N]`.
    pub entropy: Tensor,
}

/// Immutable, deep-copied set of named parameters.
///
/// Taking a snapshot and loading it into another policy is the only way the
/// optimizer moves weights between its current and old policies, so the two
/// never share storage.
#[derive(Debug)]
pub struct ParameterSnapshot {
    tensors: BTreeMap<String, Tensor>,
}

impl ParameterSnapshot {
    /// Copies every variable of `vs`.
    pub fn capture(vs: &VarStore) -> Self {
        let tensors: BTreeMap<String, Tensor> = tch::no_grad(|| {
            vs.variables()
                .into_iter()
                .map(|(name, t)| (name, t.detach().copy()))
                .collect()
        });
        Self { tensors }
    }

    /// Overwrites every variable of `vs` with this snapshot.
    ///
    /// Names and shapes are checked before anything is written, so a
    /// mismatch leaves `vs` untouched.
    pub fn restore_into(&self, vs: &VarStore) -> Result<()> {
        let mut variables = vs.variables();
        if variables.len() != self.tensors.len() {
            return Err(PpoError::SnapshotMismatch(format!(
                "snapshot has {} tensors, policy has {}",
                self.tensors.len(),
                variables.len()
            )));
        }
        for (name, var) in &variables {
            let src = self
                .tensors
                .get(name)
                .ok_or_else(|| PpoError::SnapshotMismatch(format!("missing tensor `{name}`")))?;
            if src.size() != var.size() {
                return Err(PpoError::SnapshotMismatch(format!(
                    "`{name}` has shape {:?}, policy expects {:?}",
                    src.size(),
                    var.size()
                )));
            }
        }

        tch::no_grad(|| {
            for (name, var) in variables.iter_mut() {
                if let Some(src) = self.tensors.get(name) {
                    var.copy_(src);
                }
            }
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.tensors.get(name)
    }

    /// Largest absolute element difference to `other`, or `None` if the two
    /// snapshots do not hold the same tensor names.
    pub fn max_abs_diff(&self, other: &ParameterSnapshot) -> Option<f64> {
        if self.tensors.len() != other.tensors.len() {
            return None;
        }
        let mut max = 0.0f64;
        for (name, a) in &self.tensors {
            let b = other.tensors.get(name)?;
            let d = (a - b).abs().max().f_double_value(&[]).ok()?;
            max = max.max(d);
        }
        Some(max)
    }
}

/// Capabilities the PPO optimizer needs from a policy network.
pub trait ActorCriticPolicy {
    type Dist: ActionSampler;

    /// Observation length the policy accepts.
    fn state_dim(&self) -> usize;

    /// Number of discrete actions.
    fn action_dim(&self) -> usize;

    /// Action distribution for a batch of observations `[N, state_dim]`.
    fn distribution(&self, observations: &Tensor) -> Self::Dist;

    /// State-value estimates `[N]` for a batch of observations.
    fn value(&self, observations: &Tensor) -> Tensor;

    fn var_store(&self) -> &VarStore;

    fn var_store_mut(&mut self) -> &mut VarStore;

    /// Samples an action for one observation `[state_dim]` without tracking
    /// gradients, returning the action and its log-probability.
    fn act(&self, observation: &Tensor) -> Result<(usize, f64)> {
        let (action, log_prob) =
            tch::no_grad(|| self.distribution(&observation.unsqueeze(0)).sample());
        let action = action.f_int64_value(&[0])?;
        let log_prob = log_prob.f_double_value(&[0])?;
        Ok((action as usize, log_prob))
    }

    /// Scores previously taken actions under the current parameters.
    fn evaluate(&self, observations: &Tensor, actions: &Tensor) -> Evaluation {
        let dist = self.distribution(observations);
        Evaluation {
            log_probs: dist.log_prob(actions),
            values: self.value(observations),
            entropy: dist.entropy(),
        }
    }

    fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot::capture(self.var_store())
    }

    fn load_snapshot(&mut self, snapshot: &ParameterSnapshot) -> Result<()> {
        snapshot.restore_into(self.var_store())
    }
}
