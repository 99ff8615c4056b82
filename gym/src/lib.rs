//! Reinforcement-learning environment around the `tetris-core` simulator.
//!
//! [`TetrisEnv`] exposes eight discrete actions, encodes the board into one of
//! two observation layouts and shapes a reward from score and stack height.
pub mod action;
pub mod encoder;
pub mod env;
mod error;
pub mod render;
pub mod reward;
pub mod simulator;
pub mod space;

pub use action::{ACTION_COUNT, ACTIONS, action_id, translate};
pub use encoder::{EncoderMode, Observation, PieceDescriptor, StateEncoder};
pub use env::{ACTION_KEY, EnvConfig, Lifecycle, Step, TetrisEnv};
pub use error::{EnvError, Result};
pub use render::{Color, FrameBuffer, RenderDiffTracker, Surface, View};
pub use reward::{RewardConfig, RewardShaper};
pub use simulator::{Grid, Simulator};
pub use space::{Space, Value};
pub use tetris_core::tetris::{Command, PieceKind};
