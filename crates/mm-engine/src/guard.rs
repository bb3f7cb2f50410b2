//! Guards: unit + range + doc enforced on every write.

use core::fmt;

use mm_core::{Quantity, Real, Unit};

use crate::error::{EngineError, EngineResult};
use crate::provenance::ProvenanceSink;

/// Closed interval `[low, high]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardRange {
    pub low: Quantity,
    pub high: Quantity,
}

impl GuardRange {
    pub fn new(low: Quantity, high: Quantity) -> Self {
        Self { low, high }
    }

    /// Tag raw bounds with `unit` (dimensionless when absent).
    pub fn from_raw(low: Real, high: Real, unit: Option<&Unit>) -> Self {
        let unit = unit.cloned().unwrap_or_else(Unit::dimensionless);
        Self {
            low: Quantity::new(low, unit.clone()),
            high: Quantity::new(high, unit),
        }
    }
}

impl fmt::Display for GuardRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Guard {
    pub unit: Option<Unit>,
    pub range: Option<GuardRange>,
    pub doc: Option<String>,
}

impl Guard {
    pub fn new(unit: Option<Unit>, range: Option<GuardRange>, doc: Option<String>) -> Self {
        Self { unit, range, doc }
    }

    /// Convert `value` to the canonical unit and check it against the range.
    ///
    /// The citation tag of an accepted value is offered to `sink`.
    pub fn validate(
        &self,
        attribute: &str,
        value: Quantity,
        sink: Option<&dyn ProvenanceSink>,
    ) -> EngineResult<Quantity> {
        let value = match &self.unit {
            Some(unit) => value
                .to(unit)
                .map_err(|e| EngineError::for_attribute(attribute, e))?,
            None => value,
        };
        if let Some(range) = &self.range {
            let inside = value
                .within(&range.low, &range.high)
                .map_err(|e| EngineError::for_attribute(attribute, e))?;
            if !inside {
                return Err(EngineError::OutOfRange {
                    attribute: attribute.to_string(),
                    value: value.to_string(),
                    range: range.to_string(),
                });
            }
        }
        if let (Some(sink), Some(tag)) = (sink, value.citation()) {
            sink.cite(tag);
        }
        Ok(value)
    }

    /// Human-readable description: `"<doc>. <attribute> should be given in <unit>"`.
    pub fn describe(&self, attribute: &str) -> String {
        let unit = self
            .unit
            .as_ref()
            .map_or_else(|| "any unit".to_string(), |u| u.to_string());
        match &self.doc {
            Some(doc) => format!("{doc}. {attribute} should be given in {unit}"),
            None => format!("{attribute} should be given in {unit}"),
        }
    }
}
