//! mm-engine: reactive attribute network for material models.
//!
//! Provides:
//! - Guards: per-attribute unit conversion and range validation
//! - Transforms: rival formulas deriving an attribute from bound inputs
//! - Observer edges stored on the producing entity
//! - Propagation waves that recompute dependents until nothing changes
//! - A `Network` arena holding entities addressed by `EntityId`
//!
//! # Example
//!
//! ```
//! use mm_engine::{Binding, Formula, Network, SchemaBuilder};
//! use mm_core::Quantity;
//!
//! let square = Formula::new("square", |args| Ok(Some(args.get("x_var")?.powi(2))));
//! let schema = SchemaBuilder::new("Square")
//!     .guard("x", "m")
//!     .guard("y", "m^2")
//!     .link("y", square, [("x_var", Binding::local("x"))])
//!     .build()
//!     .unwrap();
//!
//! let mut net = Network::new();
//! let id = net.add(schema).unwrap();
//! net.set(id, "x", Quantity::parse("200 cm").unwrap()).unwrap();
//! assert_eq!(net.get(id, "y").unwrap().and_then(|y| y.value()), Some(4.0));
//! ```

pub mod binding;
pub mod config;
pub mod entity;
pub mod error;
pub mod guard;
pub mod network;
pub mod observer;
pub(crate) mod propagate;
pub mod provenance;
pub mod schema;
pub mod transform;

// Re-exports for ergonomics
pub use binding::{Binding, Slot};
pub use config::{EngineConfig, SelectionPolicy};
pub use entity::{Entity, StateValue};
pub use error::{EngineError, EngineResult};
pub use guard::{Guard, GuardRange};
pub use network::Network;
pub use observer::ObserverGraph;
pub use provenance::{Bibliography, ProvenanceSink};
pub use schema::{EntitySchema, SchemaBuilder};
pub use transform::{Formula, FormulaArgs, Transform};
