//! Provenance collection.
//!
//! Guards offer the citation tag of every value they accept to an optional
//! sink. Sinks observe only; they cannot fail or alter a write.

use std::collections::BTreeSet;

use parking_lot::Mutex;

pub trait ProvenanceSink: Send + Sync {
    fn cite(&self, tag: &str);
}

/// Collects distinct citation tags.
#[derive(Debug, Default)]
pub struct Bibliography {
    cited: Mutex<BTreeSet<String>>,
}

impl Bibliography {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags cited so far, sorted.
    pub fn cited(&self) -> Vec<String> {
        self.cited.lock().iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cited.lock().is_empty()
    }
}

impl ProvenanceSink for Bibliography {
    fn cite(&self, tag: &str) {
        self.cited.lock().insert(tag.to_string());
    }
}
