//! Global provides index: unit name -> names of the archives providing it.
//!
//! Shared across scan workers, so the map is concurrent and updates are
//! append-only set unions; any interleaving of registrations produces the
//! same index. Nested sub-archives register independently of their parent.

use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
pub struct GlobalIndex {
    providers: DashMap<String, BTreeSet<String>>,
}

impl GlobalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `archive` provides `unit`. Idempotent.
    pub fn register(&self, unit: &str, archive: &str) {
        self.providers
            .entry(unit.to_string())
            .or_default()
            .insert(archive.to_string());
    }

    pub fn providers(&self, unit: &str) -> BTreeSet<String> {
        self.providers
            .get(unit)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn is_provided(&self, unit: &str) -> bool {
        self.providers.contains_key(unit)
    }

    /// Units provided by more than one archive, for the "provided by
    /// multiple archives" report.
    pub fn multi_providers(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.providers
            .iter()
            .filter(|entry| entry.value().len() > 1)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Sorted snapshot for serialization.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.providers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
