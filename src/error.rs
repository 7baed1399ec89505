use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring, feeding, or updating the PPO optimizer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PpoError {
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Observation has {actual} features, policy expects {expected}")]
    ObservationShape { expected: usize, actual: usize },

    #[error("Action {action} is outside the action space of size {action_dim}")]
    ActionOutOfRange { action: usize, action_dim: usize },

    #[error("Rollout memory is desynchronized: {0}")]
    MemoryDesync(String),

    #[error("Parameter snapshot does not match policy: {0}")]
    SnapshotMismatch(String),

    #[error("An action was proposed but its outcome was never recorded")]
    UnrecordedAction,

    #[error("No proposed action is waiting for an outcome")]
    NoPendingAction,

    #[error("Loss became non-finite during epoch {epoch}")]
    NonFiniteLoss { epoch: usize },

    #[error("Tensor backend error: {0}")]
    Torch(String),

    #[error("Checkpoint {path:?} could not be used: {reason}")]
    Checkpoint { path: PathBuf, reason: String },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PpoError>;

#[cfg(feature = "nn")]
impl From<tch::TchError> for PpoError {
    fn from(err: tch::TchError) -> Self {
        PpoError::Torch(err.to_string())
    }
}

impl PpoError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PpoError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
