//! Engine configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! selection: last_success
//! max_wave_depth: 64
//! rollback_on_error: true
//! abs_tolerance: 1.0e-12
//! rel_tolerance: 1.0e-9
//! ```

use std::path::Path;

use mm_core::Tolerances;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// How the weighted scan over rival formulas picks a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Stop at the first formula that yields a value.
    FirstSuccess,
    /// Evaluate every runnable formula; the last value produced wins, so the
    /// formula reading the most freshly written inputs has the final say.
    #[default]
    LastSuccess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection: SelectionPolicy,
    /// Maximum nesting of notifications within one wave.
    pub max_wave_depth: usize,
    /// Restore every slot a failed wave already wrote.
    pub rollback_on_error: bool,
    pub abs_tolerance: f64,
    pub rel_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let tol = Tolerances::default();
        Self {
            selection: SelectionPolicy::default(),
            max_wave_depth: 64,
            rollback_on_error: true,
            abs_tolerance: tol.abs,
            rel_tolerance: tol.rel,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> EngineResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Tolerances used to decide whether a recomputed value changed.
    pub fn tolerances(&self) -> Tolerances {
        Tolerances {
            abs: self.abs_tolerance,
            rel: self.rel_tolerance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let cfg = EngineConfig::from_yaml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.selection, SelectionPolicy::LastSuccess);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg = EngineConfig::from_yaml_str("selection: first_success\nmax_wave_depth: 8\n").unwrap();
        assert_eq!(cfg.selection, SelectionPolicy::FirstSuccess);
        assert_eq!(cfg.max_wave_depth, 8);
        assert!(cfg.rollback_on_error);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(EngineConfig::from_yaml_str("selection: random\n").is_err());
    }
}
