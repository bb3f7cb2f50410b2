//! Observer edges, stored on the entity that owns the upstream attribute.
//!
//! Notification is push-based: when `source` changes, every target slot in
//! `edges[source]` is asked to recompute.

use std::collections::{BTreeMap, BTreeSet};

use mm_core::EntityId;

use crate::binding::Slot;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverGraph {
    edges: BTreeMap<String, BTreeSet<Slot>>,
}

impl ObserverGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: impl Into<String>, target: Slot) {
        self.edges.entry(source.into()).or_default().insert(target);
    }

    /// Drop one edge; empty observer sets are removed.
    pub fn remove(&mut self, source: &str, target: &Slot) -> bool {
        let Some(targets) = self.edges.get_mut(source) else {
            return false;
        };
        let removed = targets.remove(target);
        if targets.is_empty() {
            self.edges.remove(source);
        }
        removed
    }

    /// Targets observing `source`, in deterministic order.
    pub fn dependents(&self, source: &str) -> Vec<Slot> {
        self.edges
            .get(source)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_dependents(&self, source: &str) -> bool {
        self.edges.contains_key(source)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Copy for a cloned entity: edges that target `from` are re-pointed at
    /// `to`; edges into any other entity are dropped.
    pub fn rehomed(&self, from: EntityId, to: EntityId) -> Self {
        let mut out = Self::new();
        for (source, targets) in &self.edges {
            for target in targets.iter().filter(|t| t.entity == from) {
                out.register(source.clone(), Slot::new(to, target.attribute.clone()));
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.edges
            .iter()
            .flat_map(|(source, targets)| targets.iter().map(move |t| (source.as_str(), t)))
    }
}
