//! Material files: a bundle name, logistic fields and ordered writes.
//!
//! ```yaml
//! bundle: thermal
//! name: water
//! category: fluid
//! set:
//!   - density=997 kg/m^3
//!   - temperature=25 degC
//! ```

use std::path::Path;

use mm_core::{EntityId, Quantity};
use mm_engine::{Network, StateValue};
use serde::{Deserialize, Serialize};

use crate::bundles;
use crate::category::Category;
use crate::error::{PropError, PropResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSpec {
    pub bundle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// `attribute=value` writes, applied in order.
    pub set: Vec<String>,
}

impl MaterialSpec {
    pub fn from_yaml_str(text: &str) -> PropResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> PropResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml_string(&self) -> PropResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Add the bundle to `net`, fill the logistic fields and apply the writes.
    pub fn instantiate(&self, net: &mut Network) -> PropResult<EntityId> {
        let id = net.add(bundles::by_name(&self.bundle)?)?;
        if let Some(name) = &self.name {
            net.set_logistic(id, "name", name.as_str())?;
        }
        let category = self.category.unwrap_or_default();
        net.set_logistic(id, "category", category.as_str())?;
        for assignment in &self.set {
            let (attribute, value) = parse_assignment(assignment)?;
            net.set(id, attribute, value)?;
        }
        Ok(id)
    }

    /// Capture the known state of entity `id`; physical values are written
    /// out in their guard units.
    pub fn snapshot(net: &Network, id: EntityId) -> PropResult<Self> {
        let entity = net.entity(id)?;
        let mut spec = MaterialSpec {
            bundle: entity.kind().to_ascii_lowercase(),
            ..Self::default()
        };
        for (field, value) in entity.state() {
            match (field.as_str(), value) {
                ("name", StateValue::Logistic(name)) => spec.name = Some(name),
                ("category", StateValue::Logistic(c)) => spec.category = Some(c.parse()?),
                (_, StateValue::Physical(q)) => spec.set.push(format!("{field}={q}")),
                (_, StateValue::Logistic(_)) => {}
            }
        }
        Ok(spec)
    }
}

/// Split `"attribute=2 m"` into the attribute name and a parsed quantity.
pub fn parse_assignment(text: &str) -> PropResult<(&str, Quantity)> {
    let (attribute, value) = text
        .split_once('=')
        .ok_or_else(|| PropError::Assignment(text.to_string()))?;
    let attribute = attribute.trim();
    if attribute.is_empty() {
        return Err(PropError::Assignment(text.to_string()));
    }
    Ok((attribute, Quantity::parse(value)?))
}
