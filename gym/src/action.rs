use tetris_core::tetris::Command;

use crate::{EnvError, Result};

pub const ACTION_COUNT: usize = 8;

/// Board command for each action id. The index is the id.
pub const ACTIONS: [Command; ACTION_COUNT] = [
    Command::Hold,
    Command::HardDrop,
    Command::SoftDrop,
    Command::Left,
    Command::Right,
    Command::Cw,
    Command::Ccw,
    Command::NoOp,
];

pub fn translate(action: i64) -> Result<Command> {
    usize::try_from(action)
        .ok()
        .and_then(|idx| ACTIONS.get(idx))
        .copied()
        .ok_or(EnvError::ActionOutOfRange(action))
}

/// Inverse of [`translate`].
pub const fn action_id(command: Command) -> i64 {
    match command {
        Command::Hold => 0,
        Command::HardDrop => 1,
        Command::SoftDrop => 2,
        Command::Left => 3,
        Command::Right => 4,
        Command::Cw => 5,
        Command::Ccw => 6,
        Command::NoOp => 7,
    }
}
