//! Drivers that run agents against [`tetris_gym::TetrisEnv`].
pub mod agent;
pub mod cancel;
pub mod cli;
pub mod logging;
pub mod train;
pub mod tui;
