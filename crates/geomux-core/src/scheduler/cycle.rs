//! Per-cycle "already offered" bookkeeping shared by the policies.

use std::collections::HashSet;

/// Names offered since the last `reset_available`.
#[derive(Debug, Clone, Default)]
pub(crate) struct Cycle {
    offered: HashSet<String>,
}

impl Cycle {
    pub(crate) fn reset(&mut self) {
        self.offered.clear();
    }

    /// Mark `name` as offered. Returns false if it already was.
    pub(crate) fn offer(&mut self, name: &str) -> bool {
        self.offered.insert(name.to_string())
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.offered.contains(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.offered.len()
    }
}
