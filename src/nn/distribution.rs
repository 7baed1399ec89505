//! Categorical action distribution.

use tch::{Kind, Tensor};

/// An action distribution that can sample from itself and score actions.
pub trait ActionSampler {
    /// Draws one action per row and returns `(actions, log_probs)`.
    fn sample(&self) -> (Tensor, Tensor);

    /// Log-probability of each given action.
    fn log_prob(&self, actions: &Tensor) -> Tensor;

    /// Entropy of each row's distribution.
    fn entropy(&self) -> Tensor;
}

/// Categorical distribution over the last dimension of a logits tensor.
pub struct Categorical {
    log_probs: Tensor,
}

impl Categorical {
    /// Builds the distribution from unnormalized logits.
    pub fn from_logits(logits: &Tensor) -> Self {
        Self {
            log_probs: logits.log_softmax(-1, Kind::Float),
        }
    }

    /// Normalized log-probabilities of every action.
    pub fn log_probs(&self) -> &Tensor {
        &self.log_probs
    }

    /// Probabilities of every action.
    pub fn probs(&self) -> Tensor {
        self.log_probs.exp()
    }
}

impl ActionSampler for Categorical {
    fn sample(&self) -> (Tensor, Tensor) {
        let actions = self.probs().multinomial(1, true).squeeze_dim(-1);
        let log_probs = self.log_prob(&actions);
        (actions, log_probs)
    }

    fn log_prob(&self, actions: &Tensor) -> Tensor {
        self.log_probs
            .gather(-1, &actions.unsqueeze(-1), false)
            .squeeze_dim(-1)
    }

    fn entropy(&self) -> Tensor {
        -(self.probs() * &self.log_probs).sum_dim_intlist([-1].as_slice(), false, Kind::Float)
    }
}
