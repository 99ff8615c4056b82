use thiserror::Error;

use crate::ACTION_COUNT;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("action id {0} is outside 0..{ACTION_COUNT}")]
    ActionOutOfRange(i64),
    #[error("next-piece queue holds {available} pieces but {required} are observed")]
    QueueTooShort { required: usize, available: usize },
    #[error("environment is closed")]
    Closed,
    #[error("drawing surface failed: {0}")]
    Surface(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnvError>;
