//! Transforms: rival formulas that derive an attribute from bound inputs.

use core::fmt;
use std::collections::BTreeSet;
use std::sync::Arc;

use mm_core::{EntityId, Quantity};

use crate::binding::{Binding, Slot};
use crate::error::{EngineError, EngineResult};

type FormulaFn = dyn Fn(&FormulaArgs) -> EngineResult<Option<Quantity>> + Send + Sync;

/// A named, pure function of named parameters.
///
/// Returning `Ok(None)` means "cannot say yet"; the engine then tries the next
/// candidate. Errors abort the wave.
#[derive(Clone)]
pub struct Formula {
    name: Arc<str>,
    func: Arc<FormulaFn>,
}

impl Formula {
    pub fn new(
        name: impl Into<Arc<str>>,
        func: impl Fn(&FormulaArgs) -> EngineResult<Option<Quantity>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, args: &FormulaArgs) -> EngineResult<Option<Quantity>> {
        (self.func)(args)
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Formula").field(&self.name).finish()
    }
}

/// Resolved arguments of one formula call, in declaration order.
#[derive(Debug, Clone)]
pub struct FormulaArgs {
    formula: Arc<str>,
    values: Vec<(String, Quantity)>,
}

impl FormulaArgs {
    pub fn new(formula: impl Into<Arc<str>>, values: Vec<(String, Quantity)>) -> Self {
        Self {
            formula: formula.into(),
            values,
        }
    }

    pub fn get(&self, param: &str) -> EngineResult<&Quantity> {
        self.values
            .iter()
            .find(|(name, _)| name == param)
            .map(|(_, q)| q)
            .ok_or_else(|| EngineError::MissingArgument {
                formula: self.formula.to_string(),
                param: param.to_string(),
            })
    }

    /// Argument values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &Quantity> {
        self.values.iter().map(|(_, q)| q)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }
}

/// One way of deriving `attribute`.
#[derive(Debug, Clone)]
pub struct Transform {
    pub attribute: String,
    pub formula: Formula,
    pub args: Vec<(String, Binding)>,
}

impl Transform {
    pub fn new(attribute: impl Into<String>, formula: Formula, args: Vec<(String, Binding)>) -> Self {
        Self {
            attribute: attribute.into(),
            formula,
            args,
        }
    }

    /// Slots this transform reads, for a transform owned by `owner`.
    pub fn inputs(&self, owner: EntityId) -> BTreeSet<Slot> {
        self.args
            .iter()
            .filter_map(|(_, binding)| binding.slot(owner))
            .collect()
    }

    pub fn reads(&self, owner: EntityId, slot: &Slot) -> bool {
        self.args
            .iter()
            .any(|(_, b)| b.slot(owner).as_ref() == Some(slot))
    }

    /// Share of this transform's bindings already touched in the wave.
    ///
    /// Constants count towards the total but are never visited.
    pub fn weight(&self, owner: EntityId, visited: &BTreeSet<Slot>) -> f64 {
        if self.args.is_empty() {
            return 0.0;
        }
        let hits = self
            .args
            .iter()
            .filter(|(_, b)| b.slot(owner).is_some_and(|s| visited.contains(&s)))
            .count();
        hits as f64 / self.args.len() as f64
    }
}

/// Order rival transforms by ascending weight.
///
/// The sort is stable, so equally weighted transforms keep their link order.
pub fn select(
    transforms: &[Arc<Transform>],
    owner: EntityId,
    visited: &BTreeSet<Slot>,
) -> Vec<Arc<Transform>> {
    let mut weighted: Vec<(f64, Arc<Transform>)> = transforms
        .iter()
        .map(|t| (t.weight(owner, visited), Arc::clone(t)))
        .collect();
    weighted.sort_by(|a, b| a.0.total_cmp(&b.0));
    weighted.into_iter().map(|(_, t)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Formula {
        Formula::new(name.to_string(), |_| Ok(None))
    }

    fn transform(name: &str, inputs: &[&str]) -> Arc<Transform> {
        let args = inputs
            .iter()
            .map(|i| (i.to_string(), Binding::local(*i)))
            .collect();
        Arc::new(Transform::new("target", noop(name), args))
    }

    #[test]
    fn weight_is_visited_share() {
        let owner = EntityId::from_index(0).unwrap();
        let t = transform("f", &["a", "b", "c", "d"]);
        let visited: BTreeSet<Slot> = [Slot::new(owner, "a"), Slot::new(owner, "c")].into();
        assert_eq!(t.weight(owner, &visited), 0.5);
        assert_eq!(t.weight(EntityId::from_index(1).unwrap(), &visited), 0.0);
    }

    #[test]
    fn constants_dilute_weight() {
        let owner = EntityId::from_index(0).unwrap();
        let args = vec![
            ("x".to_string(), Binding::local("x")),
            ("k".to_string(), Binding::constant(2.0)),
        ];
        let t = Transform::new("y", noop("scale"), args);
        let visited: BTreeSet<Slot> = [Slot::new(owner, "x")].into();
        assert_eq!(t.weight(owner, &visited), 0.5);
        assert_eq!(t.inputs(owner).len(), 1);
    }

    #[test]
    fn select_orders_least_touched_first() {
        let owner = EntityId::from_index(0).unwrap();
        let list = vec![
            transform("touched", &["a"]),
            transform("half", &["a", "b"]),
            transform("fresh", &["c"]),
            transform("fresh_too", &["d"]),
        ];
        let visited: BTreeSet<Slot> = [Slot::new(owner, "a")].into();
        let order: Vec<String> = select(&list, owner, &visited)
            .iter()
            .map(|t| t.formula.name().to_string())
            .collect();
        assert_eq!(order, ["fresh", "fresh_too", "half", "touched"]);
    }

    #[test]
    fn args_report_missing_parameter() {
        let args = FormulaArgs::new("f", vec![("a".into(), Quantity::from(1.0))]);
        assert!(args.get("a").is_ok());
        assert!(matches!(
            args.get("b"),
            Err(EngineError::MissingArgument { param, .. }) if param == "b"
        ));
    }
}
