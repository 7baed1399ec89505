//! Rollout memory for one trajectory segment.

use crate::error::{PpoError, Result};

/// Append-only rollout buffer, stored as five parallel columns.
///
/// Columns always have equal length; the fields are private so the only
/// ways to change them are [`Memory::record`] and [`Memory::clear`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memory {
    observations: Vec<Vec<f64>>,
    actions: Vec<usize>,
    logprobs: Vec<f64>,
    rewards: Vec<f64>,
    terminals: Vec<bool>,
}

impl Memory {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one transition.
    pub fn record(
        &mut self,
        observation: Vec<f64>,
        action: usize,
        logprob: f64,
        reward: f64,
        terminal: bool,
    ) {
        self.observations.push(observation);
        self.actions.push(action);
        self.logprobs.push(logprob);
        self.rewards.push(reward);
        self.terminals.push(terminal);
    }

    /// Empties every column, keeping the allocations for the next segment.
    pub fn clear(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.logprobs.clear();
        self.rewards.clear();
        self.terminals.clear();
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// Returns true if nothing has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Recorded observations, oldest first.
    pub fn observations(&self) -> &[Vec<f64>] {
        &self.observations
    }

    /// Recorded action indices.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    /// Log-probabilities of the recorded actions under the sampling policy.
    pub fn logprobs(&self) -> &[f64] {
        &self.logprobs
    }

    /// Recorded rewards.
    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Episode-end flags.
    pub fn terminals(&self) -> &[bool] {
        &self.terminals
    }

    /// Checks that the buffer can be stacked into a `[len, state_dim]` batch
    /// for a policy with `action_dim` actions.
    pub fn validate(&self, state_dim: usize, action_dim: usize) -> Result<()> {
        let n = self.len();
        let lengths = [
            self.observations.len(),
            self.actions.len(),
            self.logprobs.len(),
            self.terminals.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(PpoError::MemoryDesync(format!(
                "column lengths {lengths:?} disagree with {n} rewards"
            )));
        }

        if let Some(obs) = self.observations.iter().find(|o| o.len() != state_dim) {
            return Err(PpoError::ObservationShape {
                expected: state_dim,
                actual: obs.len(),
            });
        }
        if let Some(&action) = self.actions.iter().find(|&&a| a >= action_dim) {
            return Err(PpoError::ActionOutOfRange { action, action_dim });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(m: &Memory) -> [usize; 5] {
        [
            m.observations().len(),
            m.actions().len(),
            m.logprobs().len(),
            m.rewards().len(),
            m.terminals().len(),
        ]
    }

    #[test]
    fn record_preserves_order() {
        let mut m = Memory::new();
        assert!(m.is_empty());
        m.record(vec![0.0, 1.0], 1, -0.7, 1.0, false);
        m.record(vec![2.0, 3.0], 0, -0.2, -1.0, true);

        assert_eq!(m.len(), 2);
        assert_eq!(m.actions(), &[1, 0]);
        assert_eq!(m.rewards(), &[1.0, -1.0]);
        assert_eq!(m.terminals(), &[false, true]);
        assert_eq!(m.observations()[1], vec![2.0, 3.0]);
    }

    #[test]
    fn clear_then_record() {
        let mut m = Memory::new();
        for i in 0..4 {
            m.record(vec![i as f64], 0, -0.5, 0.1, i == 3);
        }
        m.clear();
        assert_eq!(lengths(&m), [0; 5]);
        assert!(m.is_empty());

        m.record(vec![1.0], 1, -0.1, 0.0, false);
        assert_eq!(lengths(&m), [1; 5]);
    }

    #[test]
    fn validate_catches_bad_shapes() {
        let mut m = Memory::new();
        m.record(vec![0.0; 4], 1, -0.5, 0.0, false);
        assert!(m.validate(4, 2).is_ok());

        assert_eq!(
            m.validate(3, 2),
            Err(PpoError::ObservationShape {
                expected: 3,
                actual: 4
            })
        );
        assert_eq!(
            m.validate(4, 1),
            Err(PpoError::ActionOutOfRange {
                action: 1,
                action_dim: 1
            })
        );
    }
}
