use std::collections::VecDeque;

use log::info;
use tetris_gym::{Simulator, Surface, TetrisEnv};

use crate::{
    agent::{Agent, Transition},
    cancel::CancelToken,
};

/// Episodes averaged for the reported mean reward.
const REWARD_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    pub total_timesteps: u64,
    /// Log a summary every this many finished episodes.
    pub print_freq: usize,
    /// Cut episodes off after this many steps.
    pub max_steps: Option<usize>,
    /// Repaint the board after every step.
    pub render: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            total_timesteps: 50_000,
            print_freq: 10,
            max_steps: None,
            render: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stat {
    pub episode: usize,
    pub reward: f64,
    pub steps: usize,
    pub reward_per_step: f64,
}

#[derive(Debug, Default)]
pub struct TrainSummary {
    pub timesteps: u64,
    pub episodes: usize,
    pub cancelled: bool,
    recent: VecDeque<Stat>,
}

impl TrainSummary {
    fn record(&mut self, stat: Stat) {
        if self.recent.len() >= REWARD_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(stat);
        self.episodes += 1;
    }

    /// Mean reward of the last finished episodes.
    pub fn mean_reward(&self) -> Option<f64> {
        if self.recent.is_empty() {
            return None;
        }
        Some(self.recent.iter().map(|s| s.reward).sum::<f64>() / self.recent.len() as f64)
    }

    pub fn last(&self) -> Option<&Stat> {
        self.recent.back()
    }
}

/// Runs the agent for `total_timesteps` steps, resetting whenever an episode ends.
/// The cancel token is checked before every step.
pub fn train_loop<G, S, A>(
    env: &mut TetrisEnv<G, S>,
    agent: &mut A,
    config: &TrainConfig,
    cancel: &CancelToken,
) -> tetris_gym::Result<TrainSummary>
where
    G: Simulator,
    S: Surface,
    A: Agent,
{
    train_loop_with(env, agent, config, cancel, |_| Ok(false))
}

/// Like [`train_loop`], but calls `poll` after every step. The token is
/// cancelled as soon as `poll` returns true.
pub fn train_loop_with<G, S, A, F>(
    env: &mut TetrisEnv<G, S>,
    agent: &mut A,
    config: &TrainConfig,
    cancel: &CancelToken,
    mut poll: F,
) -> tetris_gym::Result<TrainSummary>
where
    G: Simulator,
    S: Surface,
    A: Agent,
    F: FnMut(&mut TetrisEnv<G, S>) -> tetris_gym::Result<bool>,
{
    let mut summary = TrainSummary::default();
    let mut observation = env.reset()?;
    let mut episode_reward = 0.0;
    let mut episode_steps = 0;

    while summary.timesteps < config.total_timesteps {
        if cancel.is_cancelled() {
            info!("training stopped after {} steps", summary.timesteps);
            summary.cancelled = true;
            break;
        }

        let action = agent.act(&observation);
        let step = env.step(action)?;
        if config.render {
            env.render()?;
        }
        if poll(env)? {
            info!("Ending...");
            cancel.cancel();
        }
        agent.observe(&Transition {
            observation: &observation,
            action,
            reward: step.reward,
            next_observation: &step.observation,
            done: step.done,
        });
        summary.timesteps += 1;
        episode_reward += step.reward;
        episode_steps += 1;

        let truncated = config.max_steps.is_some_and(|max| episode_steps >= max);
        if !(step.done || truncated) {
            observation = step.observation;
            continue;
        }

        summary.record(Stat {
            episode: summary.episodes,
            reward: episode_reward,
            steps: episode_steps,
            reward_per_step: episode_reward / episode_steps as f64,
        });
        if config.print_freq > 0 && summary.episodes % config.print_freq == 0 {
            info!(
                "steps {} | episodes {} | mean {}-episode reward {:.2}",
                summary.timesteps,
                summary.episodes,
                REWARD_WINDOW,
                summary.mean_reward().unwrap_or_default()
            );
        }
        observation = env.reset()?;
        episode_reward = 0.0;
        episode_steps = 0;
    }

    Ok(summary)
}
