//! Property catalog errors.

use mm_core::MmError;
use mm_engine::EngineError;
use thiserror::Error;

pub type PropResult<T> = Result<T, PropError>;

#[derive(Error, Debug)]
pub enum PropError {
    #[error("Unknown bundle '{0}'")]
    UnknownBundle(String),

    #[error("Unknown material category '{0}'")]
    UnknownCategory(String),

    /// A `attribute=value` write that could not be split.
    #[error("Malformed assignment '{0}', expected attribute=value")]
    Assignment(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Core(#[from] MmError),

    #[error("Material file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
