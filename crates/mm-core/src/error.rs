use thiserror::Error;

pub type MmResult<T> = Result<T, MmError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MmError {
    #[error("Cannot convert from '{from}' ({from_dim}) to '{to}' ({to_dim})")]
    Dimensionality {
        from: String,
        to: String,
        from_dim: String,
        to_dim: String,
    },

    #[error("Unknown unit '{unit}'")]
    UnknownUnit { unit: String },

    #[error("Parse error: {what}")]
    Parse { what: String },

    #[error("Shape mismatch: {left} elements vs {right} elements")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Offset unit '{unit}' cannot be combined with other units")]
    OffsetUnit { unit: String },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}
