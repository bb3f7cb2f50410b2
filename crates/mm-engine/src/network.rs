//! The entity arena.
//!
//! Entities are addressed by `EntityId` (index into `entities`). Cross-entity
//! formulas bind `Remote` slots; the observer edge lives on the producer.

use core::fmt;
use std::sync::Arc;

use mm_core::{EntityId, Quantity};
use tracing::{debug, warn};

use crate::binding::{Binding, Slot};
use crate::config::EngineConfig;
use crate::entity::{Entity, StateValue};
use crate::error::{EngineError, EngineResult};
use crate::guard::Guard;
use crate::provenance::ProvenanceSink;
use crate::schema::EntitySchema;
use crate::transform::{Formula, Transform};

/// A set of entities plus the engine settings their waves run under.
///
/// Cloning a network deep-copies every entity, value and edge; schemas,
/// formulas and the provenance sink stay shared.
#[derive(Clone, Default)]
pub struct Network {
    pub(crate) entities: Vec<Entity>,
    pub(crate) config: EngineConfig,
    pub(crate) sink: Option<Arc<dyn ProvenanceSink>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Offer the citation of every accepted value to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ProvenanceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Instantiate a schema. Every attribute starts unknown.
    pub fn add(&mut self, schema: impl Into<Arc<EntitySchema>>) -> EngineResult<EntityId> {
        let id = self.next_id()?;
        let entity = Entity::new(id, schema.into());
        debug!(entity = %id, kind = entity.kind(), "added");
        self.entities.push(entity);
        Ok(id)
    }

    fn next_id(&self) -> EngineResult<EntityId> {
        let len = self.entities.len();
        EntityId::from_position(len).ok_or(EngineError::NetworkFull { len })
    }

    pub fn entity(&self, id: EntityId) -> EngineResult<&Entity> {
        self.entities
            .get(id.position())
            .ok_or(EngineError::UnknownEntity(id))
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> EngineResult<&mut Entity> {
        self.entities
            .get_mut(id.position())
            .ok_or(EngineError::UnknownEntity(id))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub(crate) fn guard(&self, id: EntityId, attribute: &str) -> EngineResult<&Guard> {
        let entity = self.entity(id)?;
        entity
            .schema
            .guard(attribute)
            .ok_or_else(|| unknown_attribute(entity, attribute))
    }

    /// Current value of `attribute`; `None` while unknown.
    pub fn get(&self, id: EntityId, attribute: &str) -> EngineResult<Option<&Quantity>> {
        self.guard(id, attribute)?;
        Ok(self.entity(id)?.get(attribute))
    }

    /// Write `value`, then recompute everything that depends on it.
    pub fn set(&mut self, id: EntityId, attribute: &str, value: Quantity) -> EngineResult<()> {
        self.write_external(id, attribute, value)
    }

    /// Logistic fields are plain text; they are never validated or propagated.
    pub fn set_logistic(
        &mut self,
        id: EntityId,
        name: &str,
        value: impl Into<String>,
    ) -> EngineResult<()> {
        let entity = self.entity_mut(id)?;
        if !entity.schema.has_logistic(name) {
            return Err(unknown_attribute(entity, name));
        }
        entity.logistics.insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn logistic(&self, id: EntityId, name: &str) -> EngineResult<Option<&str>> {
        let entity = self.entity(id)?;
        if !entity.schema.has_logistic(name) {
            return Err(unknown_attribute(entity, name));
        }
        Ok(entity.logistic(name))
    }

    /// Link a formula to one instance's `attribute`.
    ///
    /// Bindings may point at other entities; a remote binding to `id` itself
    /// is stored as local. Linking a formula name that is
    /// already linked to `attribute` replaces its bindings. Nothing is
    /// recomputed until one of the inputs is written.
    pub fn link<I, K, B>(
        &mut self,
        id: EntityId,
        attribute: &str,
        formula: Formula,
        args: I,
    ) -> EngineResult<()>
    where
        I: IntoIterator<Item = (K, B)>,
        K: Into<String>,
        B: Into<Binding>,
    {
        self.guard(id, attribute)?;
        let args: Vec<(String, Binding)> = args
            .into_iter()
            .map(|(k, b)| {
                let binding: Binding = b.into();
                let binding = match binding {
                    Binding::Remote(entity, attr) if entity == id => Binding::Local(attr),
                    other => other,
                };
                (k.into(), binding)
            })
            .collect();
        for (_, binding) in &args {
            if let Some(input) = binding.slot(id) {
                self.guard(input.entity, &input.attribute)?;
            }
        }

        let name = formula.name().to_string();
        let position = self.detach(id, attribute, &name).ok();

        let transform = Arc::new(Transform::new(attribute, formula, args));
        let target = Slot::new(id, attribute);
        for input in transform.inputs(id) {
            self.entity_mut(input.entity)?
                .observers
                .register(input.attribute, target.clone());
        }
        let list = self
            .entity_mut(id)?
            .transforms
            .entry(attribute.to_string())
            .or_default();
        match position {
            Some(pos) => list.insert(pos.min(list.len()), transform),
            None => list.push(transform),
        }
        debug!(%target, formula = %name, relinked = position.is_some(), "linked");
        Ok(())
    }

    /// Remove the formula named `formula` from `attribute`.
    ///
    /// Observer edges for its inputs are dropped unless another formula on
    /// the same attribute still reads them.
    pub fn unlink(&mut self, id: EntityId, attribute: &str, formula: &str) -> EngineResult<()> {
        self.detach(id, attribute, formula)?;
        debug!(entity = %id, attribute, formula, "unlinked");
        Ok(())
    }

    /// Remove a transform and its orphaned edges; returns its former position.
    fn detach(&mut self, id: EntityId, attribute: &str, formula: &str) -> EngineResult<usize> {
        let missing = || EngineError::UnknownFormula {
            attribute: attribute.to_string(),
            formula: formula.to_string(),
        };
        let entity = self.entity_mut(id)?;
        let list = entity.transforms.get_mut(attribute).ok_or_else(missing)?;
        let pos = list
            .iter()
            .position(|t| t.formula.name() == formula)
            .ok_or_else(missing)?;
        let removed = list.remove(pos);
        let remaining = list.clone();
        if remaining.is_empty() {
            entity.transforms.remove(attribute);
        }

        let target = Slot::new(id, attribute);
        for input in removed.inputs(id) {
            if remaining.iter().any(|t| t.reads(id, &input)) {
                continue;
            }
            self.entity_mut(input.entity)?
                .observers
                .remove(&input.attribute, &target);
        }
        Ok(pos)
    }

    /// Formulas currently linked to `attribute` with their parameter names,
    /// in link order.
    pub fn linked_transforms(
        &self,
        id: EntityId,
        attribute: &str,
    ) -> EngineResult<Vec<(String, Vec<String>)>> {
        self.guard(id, attribute)?;
        Ok(self
            .entity(id)?
            .transforms_for(attribute)
            .iter()
            .map(|t| {
                let params = t.args.iter().map(|(param, _)| param.clone()).collect();
                (t.formula.name().to_string(), params)
            })
            .collect())
    }

    pub fn describe(&self, id: EntityId, attribute: &str) -> EngineResult<String> {
        Ok(self.guard(id, attribute)?.describe(attribute))
    }

    pub fn state(&self, id: EntityId) -> EngineResult<Vec<(String, StateValue)>> {
        Ok(self.entity(id)?.state())
    }

    /// Copy entity `id` into a new, independent entity, then write `overrides`
    /// into the copy with full propagation.
    ///
    /// The copy keeps its own formulas and its inputs from other entities;
    /// entities that observed the original do not observe the copy. If an
    /// override fails the copy is discarded and the network is left as it was.
    pub fn clone_entity<I, K>(&mut self, id: EntityId, overrides: I) -> EngineResult<EntityId>
    where
        I: IntoIterator<Item = (K, Quantity)>,
        K: AsRef<str>,
    {
        let original = self.entity(id)?;
        let new_id = self.next_id()?;
        let mut copy = original.clone();
        copy.id = new_id;
        copy.observers = original.observers.rehomed(id, new_id);

        let target_of = |attribute: &str| Slot::new(new_id, attribute);
        let mut remote_edges = Vec::new();
        for (attribute, list) in &copy.transforms {
            for transform in list {
                for input in transform.inputs(id) {
                    if input.entity != id {
                        remote_edges.push((input, target_of(attribute)));
                    }
                }
            }
        }
        self.entities.push(copy);
        for (input, target) in &remote_edges {
            if let Err(err) = self.entity_mut(input.entity).map(|producer| {
                producer.observers.register(input.attribute.clone(), target.clone())
            }) {
                self.discard(new_id, &remote_edges);
                return Err(err);
            }
        }
        debug!(from = %id, to = %new_id, "cloned");

        for (attribute, value) in overrides {
            if let Err(err) = self.set(new_id, attribute.as_ref(), value) {
                self.discard(new_id, &remote_edges);
                return Err(err);
            }
        }
        Ok(new_id)
    }

    /// Drop the newest entity `id` together with the edges it registered on
    /// its producers.
    fn discard(&mut self, id: EntityId, remote_edges: &[(Slot, Slot)]) {
        for (input, target) in remote_edges {
            if let Some(producer) = self.entities.get_mut(input.entity.position()) {
                producer.observers.remove(&input.attribute, target);
            }
        }
        if self.entities.last().is_some_and(|e| e.id == id) {
            self.entities.pop();
        }
        warn!(entity = %id, "clone discarded");
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("entities", &self.entities)
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

fn unknown_attribute(entity: &Entity, attribute: &str) -> EngineError {
    EngineError::UnknownAttribute {
        entity: entity.id().to_string(),
        kind: entity.kind().to_string(),
        attribute: attribute.to_string(),
    }
}
