//! MLP actor-critic using tch-rs (PyTorch bindings).

use tch::{nn, nn::Module, Device, Tensor};

use super::distribution::Categorical;
use super::policy::ActorCriticPolicy;

/// Actor-critic with separate action and value towers.
///
/// Both towers are `state_dim → hidden → hidden → out` with tanh
/// activations; the action tower outputs logits over `action_dim` actions
/// and the value tower a single scalar.
pub struct ActorCritic {
    vs: nn::VarStore,
    action_layer: nn::Sequential,
    value_layer: nn::Sequential,
    state_dim: usize,
    action_dim: usize,
}

impl ActorCritic {
    /// Creates a freshly initialized network with its own variable store.
    pub fn new(state_dim: usize, action_dim: usize, hidden_dim: usize, device: Device) -> Self {
        let vs = nn::VarStore::new(device);
        let p = &vs.root();
        let (s, h) = (state_dim as i64, hidden_dim as i64);

        let action_layer = nn::seq()
            .add(nn::linear(p / "action" / "l1", s, h, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(p / "action" / "l2", h, h, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(
                p / "action" / "l3",
                h,
                action_dim as i64,
                Default::default(),
            ));

        let value_layer = nn::seq()
            .add(nn::linear(p / "value" / "l1", s, h, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(p / "value" / "l2", h, h, Default::default()))
            .add_fn(|x| x.tanh())
            .add(nn::linear(p / "value" / "l3", h, 1, Default::default()));

        Self {
            vs,
            action_layer,
            value_layer,
            state_dim,
            action_dim,
        }
    }
}

impl ActorCriticPolicy for ActorCritic {
    type Dist = Categorical;

    fn state_dim(&self) -> usize {
        self.state_dim
    }

    fn action_dim(&self) -> usize {
        self.action_dim
    }

    fn distribution(&self, observations: &Tensor) -> Categorical {
        Categorical::from_logits(&self.action_layer.forward(observations))
    }

    fn value(&self, observations: &Tensor) -> Tensor {
        self.value_layer.forward(observations).squeeze_dim(-1)
    }

    fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }
}
