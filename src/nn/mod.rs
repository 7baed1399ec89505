//! Policy networks and the contract the optimizer relies on.

pub mod distribution;
pub mod network;
pub mod policy;

pub use distribution::{ActionSampler, Categorical};
pub use network::ActorCritic;
pub use policy::{ActorCriticPolicy, Evaluation, ParameterSnapshot};
