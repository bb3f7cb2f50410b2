//! Entity types: guards, type-level transforms and logistic fields.
//!
//! A schema is assembled once with `SchemaBuilder`, then shared by `Arc`
//! between every entity of that type. It never changes afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use mm_core::{Real, Unit};

use crate::binding::Binding;
use crate::error::{EngineError, EngineResult};
use crate::guard::{Guard, GuardRange};
use crate::transform::{Formula, Transform};

#[derive(Debug, Clone)]
pub struct EntitySchema {
    kind: String,
    guards: BTreeMap<String, Guard>,
    transforms: BTreeMap<String, Vec<Arc<Transform>>>,
    logistic_names: Vec<String>,
}

impl EntitySchema {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn guard(&self, attribute: &str) -> Option<&Guard> {
        self.guards.get(attribute)
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.guards.contains_key(attribute)
    }

    /// Physical attribute names in sorted order; `_`-prefixed helpers are hidden.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.guards
            .keys()
            .map(String::as_str)
            .filter(|name| !name.starts_with('_'))
    }

    pub fn logistic_names(&self) -> &[String] {
        &self.logistic_names
    }

    pub fn has_logistic(&self, name: &str) -> bool {
        self.logistic_names.iter().any(|n| n == name)
    }

    pub fn transforms(&self) -> &BTreeMap<String, Vec<Arc<Transform>>> {
        &self.transforms
    }
}

/// Builder for entity schemas.
///
/// Declarations are re-enterable: configuring an attribute twice replaces the
/// earlier guard, linking the same formula name twice replaces its bindings.
/// Unit parse errors are held until `build()`.
#[derive(Debug)]
pub struct SchemaBuilder {
    kind: String,
    guards: BTreeMap<String, Guard>,
    transforms: BTreeMap<String, Vec<Arc<Transform>>>,
    logistic_names: Vec<String>,
    error: Option<EngineError>,
}

impl SchemaBuilder {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            guards: BTreeMap::new(),
            transforms: BTreeMap::new(),
            logistic_names: Vec::new(),
            error: None,
        }
    }

    /// Declare or replace the guard for `attribute`.
    ///
    /// Raw range bounds are tagged with `unit`.
    pub fn configure(
        mut self,
        attribute: &str,
        unit: Option<&str>,
        range: Option<(Real, Real)>,
        doc: Option<&str>,
    ) -> Self {
        let unit = match unit.map(Unit::parse).transpose() {
            Ok(unit) => unit,
            Err(e) => {
                self.fail(EngineError::for_attribute(attribute, e));
                return self;
            }
        };
        let range = range.map(|(low, high)| GuardRange::from_raw(low, high, unit.as_ref()));
        self.guards.insert(
            attribute.to_string(),
            Guard::new(unit, range, doc.map(str::to_string)),
        );
        self
    }

    pub fn guard(self, attribute: &str, unit: &str) -> Self {
        self.configure(attribute, Some(unit), None, None)
    }

    pub fn guard_in(self, attribute: &str, unit: &str, low: Real, high: Real) -> Self {
        self.configure(attribute, Some(unit), Some((low, high)), None)
    }

    /// Attach documentation to an already configured attribute.
    pub fn doc(mut self, attribute: &str, doc: &str) -> Self {
        if let Some(guard) = self.guards.get_mut(attribute) {
            guard.doc = Some(doc.to_string());
        } else {
            let err = self.invalid(format!("doc for undeclared attribute '{attribute}'"));
            self.fail(err);
        }
        self
    }

    /// Declare a non-physical descriptive field.
    pub fn logistic(mut self, name: &str) -> Self {
        if !self.logistic_names.iter().any(|n| n == name) {
            self.logistic_names.push(name.to_string());
        }
        self
    }

    /// Add a rival formula for `attribute`.
    pub fn link<I, K, B>(mut self, attribute: &str, formula: Formula, args: I) -> Self
    where
        I: IntoIterator<Item = (K, B)>,
        K: Into<String>,
        B: Into<Binding>,
    {
        let args: Vec<(String, Binding)> = args
            .into_iter()
            .map(|(k, b)| (k.into(), b.into()))
            .collect();
        let transform = Arc::new(Transform::new(attribute, formula, args));
        let list = self.transforms.entry(attribute.to_string()).or_default();
        match list
            .iter_mut()
            .find(|t| t.formula.name() == transform.formula.name())
        {
            Some(existing) => *existing = transform,
            None => list.push(transform),
        }
        self
    }

    /// Validate and freeze the schema.
    pub fn build(mut self) -> EngineResult<EntitySchema> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        for (attribute, list) in &self.transforms {
            if !self.guards.contains_key(attribute) {
                return Err(self.invalid(format!("transform targets undeclared '{attribute}'")));
            }
            for transform in list {
                for (param, binding) in &transform.args {
                    match binding {
                        Binding::Local(name) if !self.guards.contains_key(name) => {
                            return Err(self.invalid(format!(
                                "'{}' binds '{param}' to undeclared '{name}'",
                                transform.formula.name()
                            )));
                        }
                        Binding::Remote(..) => {
                            return Err(self.invalid(format!(
                                "'{}' binds '{param}' to another entity; link it on the instance",
                                transform.formula.name()
                            )));
                        }
                        _ => {}
                    }
                }
            }
        }
        for name in &self.logistic_names {
            if self.guards.contains_key(name) {
                return Err(self.invalid(format!("'{name}' is both logistic and physical")));
            }
        }
        Ok(EntitySchema {
            kind: self.kind,
            guards: self.guards,
            transforms: self.transforms,
            logistic_names: self.logistic_names,
        })
    }

    fn invalid(&self, what: String) -> EngineError {
        EngineError::InvalidSchema {
            kind: self.kind.clone(),
            what,
        }
    }

    fn fail(&mut self, err: EngineError) {
        self.error.get_or_insert(err);
    }
}
