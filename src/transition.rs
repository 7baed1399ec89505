//! Two-phase act/record protocol.
//!
//! An action is proposed before the environment steps and its outcome is
//! recorded afterwards. [`TransitionTracker`] holds the half-finished
//! transition in between and refuses out-of-order calls.

use crate::error::{PpoError, Result};
use crate::memory::Memory;

/// A proposed action whose reward and terminal flag are not known yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    pub observation: Vec<f64>,
    pub action: usize,
    pub logprob: f64,
}

/// Per-transition state: `Idle` until an action is proposed, then `Proposed`
/// until its outcome is recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TransitionTracker {
    #[default]
    Idle,
    Proposed(PendingTransition),
}

impl TransitionTracker {
    /// Moves `Idle` → `Proposed`.
    pub fn propose(&mut self, pending: PendingTransition) -> Result<()> {
        if self.is_pending() {
            return Err(PpoError::UnrecordedAction);
        }
        *self = TransitionTracker::Proposed(pending);
        Ok(())
    }

    /// Moves `Proposed` → `Idle`, appending the finished transition to `memory`.
    pub fn complete(&mut self, memory: &mut Memory, reward: f64, terminal: bool) -> Result<()> {
        match std::mem::take(self) {
            TransitionTracker::Idle => Err(PpoError::NoPendingAction),
            TransitionTracker::Proposed(p) => {
                memory.record(p.observation, p.action, p.logprob, reward, terminal);
                Ok(())
            }
        }
    }

    /// Drops a proposed transition without recording it.
    pub fn discard(&mut self) -> Option<PendingTransition> {
        match std::mem::take(self) {
            TransitionTracker::Idle => None,
            TransitionTracker::Proposed(p) => Some(p),
        }
    }

    /// Whether a proposed action is waiting for its outcome.
    pub fn is_pending(&self) -> bool {
        matches!(self, TransitionTracker::Proposed(_))
    }
}
