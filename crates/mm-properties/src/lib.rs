//! mm-properties: property bundles for material models.
//!
//! Provides:
//! - Elementary formulas (`reciprocal`, `mul`, `div`, `add`, `sub`, ...)
//! - Bundles: ready-made entity schemas (mass, volume, flow, thermal, viscosity)
//! - Material categories and YAML material files

pub mod bundles;
pub mod category;
pub mod error;
pub mod formulas;
pub mod material;

pub use bundles::{BUNDLE_NAMES, by_name};
pub use category::Category;
pub use error::{PropError, PropResult};
pub use material::{MaterialSpec, parse_assignment};
