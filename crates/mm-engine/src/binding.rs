//! Attribute addresses.

use core::fmt;

use mm_core::{EntityId, Quantity};

/// One attribute slot on one entity. Used as observer-graph node key and as
/// visited-set member during a wave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub entity: EntityId,
    pub attribute: String,
}

impl Slot {
    pub fn new(entity: EntityId, attribute: impl Into<String>) -> Self {
        Self {
            entity,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.attribute)
    }
}

/// Where a formula parameter takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// An attribute of the entity the formula belongs to.
    Local(String),
    /// An attribute of another entity.
    Remote(EntityId, String),
    /// A fixed value.
    Constant(Quantity),
}

impl Binding {
    pub fn local(attribute: impl Into<String>) -> Self {
        Binding::Local(attribute.into())
    }

    pub fn remote(entity: EntityId, attribute: impl Into<String>) -> Self {
        Binding::Remote(entity, attribute.into())
    }

    pub fn constant(value: impl Into<Quantity>) -> Self {
        Binding::Constant(value.into())
    }

    /// The slot this binding reads, resolved against `owner` for local bindings.
    /// Constants have none.
    pub fn slot(&self, owner: EntityId) -> Option<Slot> {
        match self {
            Binding::Local(attr) => Some(Slot::new(owner, attr.clone())),
            Binding::Remote(entity, attr) => Some(Slot::new(*entity, attr.clone())),
            Binding::Constant(_) => None,
        }
    }
}

impl From<&str> for Binding {
    fn from(attribute: &str) -> Self {
        Binding::Local(attribute.to_string())
    }
}

impl From<(EntityId, &str)> for Binding {
    fn from((entity, attribute): (EntityId, &str)) -> Self {
        Binding::Remote(entity, attribute.to_string())
    }
}

impl From<Quantity> for Binding {
    fn from(value: Quantity) -> Self {
        Binding::Constant(value)
    }
}
