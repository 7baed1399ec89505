//! Episode driver: runs the trained agent against an opponent controller and
//! triggers PPO updates at a fixed step cadence.

use tracing::{debug, info};

use super::ppo::Ppo;
use crate::config::TrainerConfig;
use crate::environment::{CombatEnvironment, Controller, JointAction, Outcome};
use crate::error::Result;
use crate::nn::{ActorCritic, ActorCriticPolicy};

/// What happened during one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// 1-based episode index.
    pub episode: usize,
    /// Environment steps taken.
    pub steps: usize,
    /// Sum of the trained agent's rewards.
    pub total_reward: f64,
    /// Result reported by the environment, if any.
    pub outcome: Option<Outcome>,
    /// PPO updates run during the episode.
    pub updates: usize,
}

/// Aggregate result of [`Trainer::train`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    /// One summary per episode played, in order.
    pub episodes: Vec<EpisodeSummary>,
    /// PPO updates run across all episodes.
    pub updates: usize,
    /// Episodes the trained agent won.
    pub wins: usize,
    /// Whether training stopped because `solved_reward` was reached.
    pub solved: bool,
}

/// Drives episodes and owns the optimizer being trained.
pub struct Trainer<P: ActorCriticPolicy = ActorCritic> {
    config: TrainerConfig,
    ppo: Ppo<P>,
    timestep: usize,
}

impl<P: ActorCriticPolicy> Trainer<P> {
    /// Validates `config` and takes ownership of `ppo`.
    ///
    /// If `config.seed` is set, libtorch's RNG is seeded here so action
    /// sampling is reproducible from this point on.
    pub fn new(config: TrainerConfig, ppo: Ppo<P>) -> Result<Self> {
        config.validate()?;
        if let Some(seed) = config.seed {
            tch::manual_seed(seed);
        }
        Ok(Self {
            config,
            ppo,
            timestep: 0,
        })
    }

    /// The optimizer being trained.
    pub fn ppo(&self) -> &Ppo<P> {
        &self.ppo
    }

    /// Consumes the driver and returns the trained optimizer.
    pub fn into_ppo(self) -> Ppo<P> {
        self.ppo
    }

    /// Environment steps taken across all episodes.
    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// Plays one episode, updating every `update_timestep` global steps.
    ///
    /// An episode cut off at `max_timesteps` is not marked terminal.
    pub fn run_episode<E, C>(
        &mut self,
        episode: usize,
        env: &mut E,
        opponent: &mut C,
    ) -> Result<EpisodeSummary>
    where
        E: CombatEnvironment,
        C: Controller,
    {
        let mut observation = env.reset();
        let mut summary = EpisodeSummary {
            episode,
            steps: 0,
            total_reward: 0.0,
            outcome: None,
            updates: 0,
        };

        for _ in 0..self.config.max_timesteps {
            self.timestep += 1;

            let own = self.ppo.select_action(&observation)?;
            let opponent_action = opponent.act(&observation, self.timestep);
            let result = env.step(JointAction {
                own,
                opponent: opponent_action,
            });
            self.ppo.record_outcome(result.reward, result.done)?;

            summary.steps += 1;
            summary.total_reward += result.reward;
            if result.outcome.is_some() {
                summary.outcome = result.outcome;
            }

            if self.timestep % self.config.update_timestep == 0 && self.ppo.update()?.is_some() {
                summary.updates += 1;
            }

            observation = result.observation;
            if result.done {
                break;
            }
        }

        debug!(
            episode,
            steps = summary.steps,
            reward = summary.total_reward,
            outcome = ?summary.outcome,
            "episode finished"
        );
        Ok(summary)
    }

    /// Trains for up to `max_episodes`, stopping early once the mean reward
    /// over the last `log_interval` episodes reaches `solved_reward`.
    pub fn train<E, C>(&mut self, env: &mut E, opponent: &mut C) -> Result<TrainingReport>
    where
        E: CombatEnvironment,
        C: Controller,
    {
        if let Some(seed) = self.config.seed {
            env.seed(seed as u64);
        }
        let mut report = TrainingReport::default();
        let mut window_reward = 0.0;
        let mut window_wins = 0;

        for episode in 1..=self.config.max_episodes {
            let summary = self.run_episode(episode, env, opponent)?;
            window_reward += summary.total_reward;
            if summary.outcome == Some(Outcome::Win) {
                report.wins += 1;
                window_wins += 1;
            }
            report.updates += summary.updates;
            report.episodes.push(summary);

            if episode % self.config.log_interval == 0 {
                let mean_reward = window_reward / self.config.log_interval as f64;
                info!(
                    episode,
                    timestep = self.timestep,
                    mean_reward,
                    wins = window_wins,
                    opponent = opponent.name(),
                    "training progress"
                );
                window_reward = 0.0;
                window_wins = 0;

                if let Some(solved) = self.config.solved_reward {
                    if mean_reward >= solved {
                        info!(episode, mean_reward, "solved");
                        report.solved = true;
                        break;
                    }
                }
            }
        }

        Ok(report)
    }
}
