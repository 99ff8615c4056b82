mod board;
mod game;

pub use board::*;
pub use game::*;
