//! Engine error types.

use mm_core::{EntityId, MmError};
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while configuring entities or running a propagation wave.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Unit conversion between incompatible dimensions.
    #[error(
        "Wrong dimensions when setting {attribute}: cannot convert '{from}' ({from_dim}) to '{to}' ({to_dim})"
    )]
    Dimensionality {
        attribute: String,
        from: String,
        to: String,
        from_dim: String,
        to_dim: String,
    },

    /// Value outside the configured range (NaN is exempt).
    #[error("Setting {attribute} with {value} is out of range {range}")]
    OutOfRange {
        attribute: String,
        value: String,
        range: String,
    },

    #[error("Unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("Entity {entity} ({kind}) has no attribute '{attribute}'")]
    UnknownAttribute {
        entity: String,
        kind: String,
        attribute: String,
    },

    #[error("No formula '{formula}' is linked to '{attribute}'")]
    UnknownFormula { attribute: String, formula: String },

    #[error("Formula '{formula}' has no argument '{param}'")]
    MissingArgument { formula: String, param: String },

    /// A formula rejected its inputs (its own numeric precondition).
    #[error("Formula '{formula}' failed: {what}")]
    Formula { formula: String, what: String },

    #[error("Propagation exceeded depth {limit} while updating {slot}")]
    WaveDepthExceeded { limit: usize, slot: String },

    #[error("Invalid schema '{kind}': {what}")]
    InvalidSchema { kind: String, what: String },

    #[error("Network is full: {len} entities")]
    NetworkFull { len: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(MmError),
}

impl EngineError {
    /// Attach the attribute name to a core error; dimension mismatches become
    /// `Dimensionality`, everything else is passed through.
    pub fn for_attribute(attribute: &str, err: MmError) -> Self {
        match err {
            MmError::Dimensionality {
                from,
                to,
                from_dim,
                to_dim,
            } => EngineError::Dimensionality {
                attribute: attribute.to_string(),
                from,
                to,
                from_dim,
                to_dim,
            },
            other => EngineError::Core(other),
        }
    }

    pub fn formula(formula: impl Into<String>, what: impl Into<String>) -> Self {
        EngineError::Formula {
            formula: formula.into(),
            what: what.into(),
        }
    }
}

impl From<MmError> for EngineError {
    fn from(err: MmError) -> Self {
        EngineError::Core(err)
    }
}
