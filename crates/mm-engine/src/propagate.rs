//! Propagation waves.
//!
//! A wave starts at one external write and walks the observer edges of every
//! slot whose value actually changed. Each slot is recomputed at most once per
//! wave; the visited set both breaks cycles and weights formula selection.

use std::collections::BTreeSet;

use mm_core::{EntityId, Quantity};
use tracing::{debug, trace, warn};

use crate::binding::{Binding, Slot};
use crate::config::SelectionPolicy;
use crate::error::{EngineError, EngineResult};
use crate::network::Network;
use crate::transform::{FormulaArgs, Transform, select};

#[derive(Debug, Default)]
pub(crate) struct Wave {
    visited: BTreeSet<Slot>,
    /// Prior values of every slot written so far, in write order.
    journal: Vec<(Slot, Option<Quantity>)>,
    depth: usize,
}

impl Network {
    /// Guard-validate an external write, store it and propagate.
    ///
    /// On failure every slot the wave touched is restored when the config asks
    /// for it; otherwise values written before the error are kept.
    pub(crate) fn write_external(
        &mut self,
        id: EntityId,
        attribute: &str,
        value: Quantity,
    ) -> EngineResult<()> {
        debug!(entity = %id, attribute, value = %value, "user write");
        let mut wave = Wave::default();
        let result = self
            .validate(id, attribute, value)
            .and_then(|value| self.commit(Slot::new(id, attribute), value, &mut wave));
        if let Err(err) = &result {
            if self.config.rollback_on_error {
                warn!(error = %err, restored = wave.journal.len(), "wave failed, rolling back");
                self.rollback(wave);
            } else {
                warn!(error = %err, kept = wave.journal.len(), "wave failed");
            }
        }
        result
    }

    fn validate(&self, id: EntityId, attribute: &str, value: Quantity) -> EngineResult<Quantity> {
        let guard = self.guard(id, attribute)?;
        guard.validate(attribute, value, self.sink.as_deref())
    }

    /// Store `value` unless it equals the current one, then notify dependents.
    fn commit(&mut self, slot: Slot, value: Quantity, wave: &mut Wave) -> EngineResult<()> {
        let tol = self.config.tolerances();
        let entity = self.entity_mut(slot.entity)?;
        if entity
            .values
            .get(&slot.attribute)
            .is_some_and(|old| old.approx_eq(&value, tol))
        {
            trace!(%slot, "unchanged");
            return Ok(());
        }
        let previous = entity.values.insert(slot.attribute.clone(), value);
        let dependents = entity.observers.dependents(&slot.attribute);
        wave.journal.push((slot.clone(), previous));
        wave.visited.insert(slot);

        wave.depth += 1;
        let mut result = Ok(());
        for dependent in dependents {
            trace!(%dependent, depth = wave.depth, "notify");
            result = self.recompute(dependent, wave);
            if result.is_err() {
                break;
            }
        }
        wave.depth -= 1;
        result
    }

    fn recompute(&mut self, slot: Slot, wave: &mut Wave) -> EngineResult<()> {
        if wave.visited.contains(&slot) {
            return Ok(());
        }
        if wave.depth > self.config.max_wave_depth {
            return Err(EngineError::WaveDepthExceeded {
                limit: self.config.max_wave_depth,
                slot: slot.to_string(),
            });
        }

        let entity = self.entity(slot.entity)?;
        let candidates = select(
            entity.transforms_for(&slot.attribute),
            slot.entity,
            &wave.visited,
        );
        let mut produced = None;
        for transform in candidates {
            let Some(args) = self.resolve(slot.entity, &transform)? else {
                debug!(%slot, formula = transform.formula.name(), "skipped, input unknown");
                continue;
            };
            trace!(
                %slot,
                formula = transform.formula.name(),
                weight = transform.weight(slot.entity, &wave.visited),
                "evaluate"
            );
            let result = transform.formula.eval(&args)?;
            if let Some(value) = result.filter(|q| !q.is_unknown()) {
                produced = Some(value);
                if self.config.selection == SelectionPolicy::FirstSuccess {
                    break;
                }
            }
        }

        let Some(value) = produced else {
            return Ok(());
        };
        let value = self.validate(slot.entity, &slot.attribute, value)?;
        debug!(%slot, value = %value, "transform write");
        self.commit(slot, value, wave)
    }

    /// Gather current values for every binding, or `None` if one is unknown.
    fn resolve(&self, owner: EntityId, transform: &Transform) -> EngineResult<Option<FormulaArgs>> {
        let mut values = Vec::with_capacity(transform.args.len());
        for (param, binding) in &transform.args {
            let value = match binding {
                Binding::Constant(q) => Some(q.clone()),
                Binding::Local(attribute) => self.entity(owner)?.get(attribute).cloned(),
                Binding::Remote(entity, attribute) => self.entity(*entity)?.get(attribute).cloned(),
            };
            let Some(value) = value else {
                return Ok(None);
            };
            values.push((param.clone(), value));
        }
        Ok(Some(FormulaArgs::new(transform.formula.name(), values)))
    }

    fn rollback(&mut self, wave: Wave) {
        for (slot, previous) in wave.journal.into_iter().rev() {
            let Ok(entity) = self.entity_mut(slot.entity) else {
                continue;
            };
            match previous {
                Some(q) => {
                    entity.values.insert(slot.attribute, q);
                }
                None => {
                    entity.values.remove(&slot.attribute);
                }
            }
        }
    }
}
