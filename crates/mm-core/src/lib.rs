//! mm-core: value layer for mechmat.
//!
//! Contains:
//! - numeric (Real + tolerances + NaN-aware comparisons)
//! - ids (compact entity handles)
//! - dimension (SI base-dimension exponents)
//! - unit (runtime units with scale/offset and a text parser)
//! - quantity (magnitude + unit + optional citation)
//! - units (uom SI aliases, constructors, and interop with `Quantity`)
//! - error (shared error types)

pub mod dimension;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod quantity;
pub mod unit;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use dimension::Dimension;
pub use error::{MmError, MmResult};
pub use ids::*;
pub use numeric::*;
pub use quantity::{Magnitude, Quantity};
pub use unit::Unit;
