//! Entities: addressable bags of guarded, linked attributes.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::Arc;

use mm_core::{EntityId, Quantity};

use crate::binding::Slot;
use crate::observer::ObserverGraph;
use crate::schema::EntitySchema;
use crate::transform::Transform;

/// One entry of an entity's printable state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Logistic(String),
    Physical(Quantity),
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Logistic(s) => write!(f, "{s}"),
            StateValue::Physical(q) => write!(f, "{q}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub(crate) schema: Arc<EntitySchema>,
    /// Absent key means "unknown".
    pub(crate) values: BTreeMap<String, Quantity>,
    pub(crate) logistics: BTreeMap<String, String>,
    pub(crate) transforms: BTreeMap<String, Vec<Arc<Transform>>>,
    pub(crate) observers: ObserverGraph,
}

impl Entity {
    /// Instantiate `schema`, wiring observer edges for its local transforms.
    pub(crate) fn new(id: EntityId, schema: Arc<EntitySchema>) -> Self {
        let transforms = schema.transforms().clone();
        let mut observers = ObserverGraph::new();
        for (attribute, list) in &transforms {
            for transform in list {
                for input in transform.inputs(id) {
                    observers.register(input.attribute, Slot::new(id, attribute.clone()));
                }
            }
        }
        Self {
            id,
            schema,
            values: BTreeMap::new(),
            logistics: BTreeMap::new(),
            transforms,
            observers,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn get(&self, attribute: &str) -> Option<&Quantity> {
        self.values.get(attribute)
    }

    pub fn logistic(&self, name: &str) -> Option<&str> {
        self.logistics.get(name).map(String::as_str)
    }

    pub fn observers(&self) -> &ObserverGraph {
        &self.observers
    }

    /// Rival transforms currently linked to `attribute`, in link order.
    pub fn transforms_for(&self, attribute: &str) -> &[Arc<Transform>] {
        self.transforms
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.schema.state_names()
    }

    pub fn logistic_names(&self) -> &[String] {
        self.schema.logistic_names()
    }

    /// Present logistic fields in declared order, then present physical
    /// attributes in sorted order.
    pub fn state(&self) -> Vec<(String, StateValue)> {
        let logistic = self.logistic_names().iter().filter_map(|name| {
            self.logistics
                .get(name)
                .map(|v| (name.clone(), StateValue::Logistic(v.clone())))
        });
        let physical = self.state_names().filter_map(|name| {
            self.values
                .get(name)
                .map(|q| (name.to_string(), StateValue::Physical(q.clone())))
        });
        logistic.chain(physical).collect()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} with state {{", self.kind())?;
        for (i, (name, value)) in self.state().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}>")
    }
}
