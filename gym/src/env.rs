use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tetris_core::tetris::{Game, RandomSeed};

use crate::{
    ACTION_COUNT, EncoderMode, EnvError, FrameBuffer, Observation, Result, RewardConfig,
    RewardShaper, Simulator, Space, StateEncoder, Surface, action::translate,
    render::{Viewer, visible_cells},
};

/// Info key holding the command string a step resolved to.
pub const ACTION_KEY: &str = "action";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EnvConfig {
    /// Seed every board is built from. `None` draws from the OS.
    pub seed: Option<RandomSeed>,
    /// Upcoming pieces included in complex observations.
    pub next_pieces: usize,
    pub mode: EncoderMode,
    pub reward: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed: None,
            next_pieces: 5,
            mode: EncoderMode::Simple,
            reward: RewardConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: BTreeMap<String, String>,
}

impl Step {
    pub fn action(&self) -> &str {
        self.info.get(ACTION_KEY).map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Ready,
    Closed,
}

/// Tetris as an episodic environment with eight discrete actions.
///
/// The board stays steppable after it dies; callers are expected to
/// [`reset`](Self::reset) once `done` is reported. The drawing surface is
/// opened by the first [`render`](Self::render) and released by
/// [`close`](Self::close) or on drop.
pub struct TetrisEnv<G: Simulator = Game, S: Surface = FrameBuffer> {
    game: G,
    seed: Option<RandomSeed>,
    encoder: StateEncoder,
    shaper: RewardShaper,
    observation_space: Space,
    viewer: Option<Viewer<S>>,
    lifecycle: Lifecycle,
}

impl<G: Simulator, S: Surface> TetrisEnv<G, S> {
    pub fn new(config: EnvConfig) -> Self {
        let game = G::with_seed(config.seed);
        let encoder = StateEncoder::new(config.mode, config.next_pieces);
        let observation_space = encoder.observation_space(&game);
        info!(
            "environment ready: {:?} observations, seed {:?}",
            config.mode, config.seed
        );
        Self {
            game,
            seed: config.seed,
            encoder,
            shaper: RewardShaper::new(config.reward),
            observation_space,
            viewer: None,
            lifecycle: Lifecycle::Ready,
        }
    }

    pub fn action_space(&self) -> Space {
        Space::Discrete(ACTION_COUNT as u32)
    }

    pub const fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    pub const fn game(&self) -> &G {
        &self.game
    }

    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub const fn shaper(&self) -> &RewardShaper {
        &self.shaper
    }

    /// The drawing surface, once a render has opened it.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.viewer.as_mut().map(|viewer| &mut viewer.surface)
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Ready => Ok(()),
            Lifecycle::Closed => {
                warn!("environment used after close");
                Err(EnvError::Closed)
            }
        }
    }

    /// Encodes the current board without advancing it.
    pub fn observation(&self) -> Result<Observation> {
        self.encoder.encode(&self.game)
    }

    pub fn step(&mut self, action: i64) -> Result<Step> {
        self.ensure_ready()?;
        let command = translate(action).inspect_err(|e| warn!("{e}"))?;

        let score_before = self.game.score();
        self.game.act(command);
        let reward = self
            .shaper
            .shape(score_before, self.game.score(), command, &self.game.cells());
        let observation = self.encoder.encode(&self.game)?;
        let done = self.game.dead();
        debug!("step {action} ({command:?}): reward {reward:.2}, done {done}");

        Ok(Step {
            observation,
            reward,
            done,
            info: BTreeMap::from([(ACTION_KEY.to_owned(), command.as_str().to_owned())]),
        })
    }

    /// Replaces the board with a fresh one built from the same seed.
    pub fn reset(&mut self) -> Result<Observation> {
        self.ensure_ready()?;
        self.game = G::with_seed(self.seed);
        debug!("reset");
        self.encoder.encode(&self.game)
    }

    /// Repaints the visible rows. Returns how many cells changed since the previous call.
    pub fn render(&mut self) -> Result<usize> {
        self.ensure_ready()?;
        let view = visible_cells(&self.game);
        let viewer = match self.viewer.take() {
            Some(viewer) => viewer,
            None => {
                info!("opening drawing surface");
                Viewer::open()?
            }
        };
        self.viewer.insert(viewer).draw(&view)
    }

    pub fn close(&mut self) {
        if let Some(viewer) = self.viewer.take() {
            viewer.close();
            info!("drawing surface released");
        }
        self.lifecycle = Lifecycle::Closed;
    }
}

impl<G: Simulator, S: Surface> Drop for TetrisEnv<G, S> {
    fn drop(&mut self) {
        if let Some(viewer) = self.viewer.take() {
            viewer.close();
        }
    }
}

#[cfg(test)]
mod test {
    use tetris_core::tetris::Command;

    use super::*;
    use crate::simulator::fake::{FakeBoard, HEIGHT};

    type FakeEnv = TetrisEnv<FakeBoard, FrameBuffer>;

    fn fake_env(mode: EncoderMode) -> FakeEnv {
        TetrisEnv::new(EnvConfig {
            seed: Some(5),
            mode,
            ..EnvConfig::default()
        })
    }

    #[test]
    fn step_acts_and_reports_command() {
        let mut env = fake_env(EncoderMode::Simple);
        let step = env.step(1).unwrap();
        assert_eq!(env.game().commands, vec![Command::HardDrop]);
        assert_eq!(step.action(), "hd");
        assert!(!step.done);
        assert!((step.reward - (0.04 + 1.0)).abs() < 1e-9);
        assert_eq!(env.step(7).unwrap().info[ACTION_KEY], "");
    }

    #[test]
    fn reward_includes_score_delta() {
        let mut env = fake_env(EncoderMode::Simple);
        env.game.score_per_act = 100;
        let step = env.step(3).unwrap();
        assert!((step.reward - 100.04).abs() < 1e-9);
    }

    #[test]
    fn invalid_action_leaves_board_untouched() {
        let mut env = fake_env(EncoderMode::Simple);
        assert!(matches!(env.step(8), Err(EnvError::ActionOutOfRange(8))));
        assert!(matches!(env.step(-3), Err(EnvError::ActionOutOfRange(-3))));
        assert!(env.game().commands.is_empty());
    }

    #[test]
    fn dead_board_stays_steppable() {
        let mut env = fake_env(EncoderMode::Simple);
        env.game.dead = true;
        assert!(env.step(0).unwrap().done);
        assert!(env.step(0).unwrap().done);
        assert_eq!(env.lifecycle(), Lifecycle::Ready);
    }

    #[test]
    fn reset_rebuilds_with_same_seed() {
        let mut env = fake_env(EncoderMode::Complex);
        env.step(2).unwrap();
        env.game.dead = true;
        env.game.score = 40;
        let obs = env.reset().unwrap();
        assert!(!env.game().dead);
        assert_eq!(env.game().score, 0);
        assert_eq!(env.game().seed, Some(5));
        assert!(env.game().commands.is_empty());
        assert!(env.observation_space().contains(&obs.to_value()));
    }

    #[test]
    fn short_queue_fails_the_step() {
        let mut env = fake_env(EncoderMode::Complex);
        env.game.next.clear();
        assert!(matches!(
            env.step(7),
            Err(EnvError::QueueTooShort { required: 5, .. })
        ));
    }

    #[test]
    fn render_is_lazy_and_incremental() {
        let mut env = fake_env(EncoderMode::Simple);
        assert!(env.surface_mut().is_none());
        // the T piece at rows 4-5 is still above the visible rows
        assert_eq!(env.render().unwrap(), 0);
        env.game.cells[HEIGHT - 1] = vec![true; 10];
        assert_eq!(env.render().unwrap(), 10);
        assert_eq!(env.render().unwrap(), 0);
        let surface = env.surface_mut().unwrap();
        assert_eq!(surface.frames, 3);
        assert_eq!(surface.fills, 10);
    }

    #[test]
    fn reset_keeps_render_state() {
        let mut env = fake_env(EncoderMode::Simple);
        env.game.cells[HEIGHT - 1][0] = true;
        assert_eq!(env.render().unwrap(), 1);
        env.reset().unwrap();
        assert_eq!(env.render().unwrap(), 1);
        assert_eq!(env.surface_mut().unwrap().pixels[19][0], crate::render::EMPTY);
    }

    #[test]
    fn close_is_idempotent_and_final() {
        let mut env = fake_env(EncoderMode::Simple);
        env.close();
        env.close();
        assert_eq!(env.lifecycle(), Lifecycle::Closed);
        assert!(matches!(env.render(), Err(EnvError::Closed)));
        assert!(matches!(env.step(0), Err(EnvError::Closed)));
        assert!(matches!(env.reset(), Err(EnvError::Closed)));
    }

    #[test]
    fn close_releases_surface() {
        let mut env = fake_env(EncoderMode::Simple);
        env.render().unwrap();
        assert!(env.surface_mut().is_some());
        env.close();
        assert!(env.surface_mut().is_none());
    }

    #[test]
    fn last_max_height_is_never_raised() {
        let mut env = fake_env(EncoderMode::Simple);
        for row in &mut env.game.cells[6..] {
            row[0] = true;
        }
        for action in 0..8 {
            env.step(action).unwrap();
            assert_eq!(env.shaper().last_max_height(), 0);
        }
        env.reset().unwrap();
        assert_eq!(env.shaper().last_max_height(), 0);
    }

    #[test]
    fn config_from_json() {
        let config: EnvConfig =
            serde_json::from_str(r#"{"seed": 9, "mode": "complex", "next_pieces": 3}"#).unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.mode, EncoderMode::Complex);
        assert_eq!(config.next_pieces, 3);
        assert_eq!(config.reward, RewardConfig::default());
        assert_eq!(
            serde_json::from_str::<EnvConfig>("{}").unwrap(),
            EnvConfig::default()
        );
    }
}
