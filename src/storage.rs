//! Storage collaborator boundary.
//!
//! The relational store is an external collaborator; this module only
//! specifies the contract the engine relies on and provides an
//! in-memory implementation for tests and dry runs.
//!
//! Contract: a bundle is keyed by its single patient identifier;
//! storing the same document's bundle again must not duplicate rows
//! (idempotent upsert); a bundle without an identifier is rejected —
//! a case this engine never produces, because identifier absence fails
//! the whole extraction instead of reaching storage.

use indexmap::IndexMap;

use crate::error::Result;
use crate::records::ReportBundle;

/// Consumer of extraction result bundles.
pub trait StorageSink {
    /// Insert or replace the bundle keyed by its patient identifier.
    fn upsert(&mut self, bundle: &ReportBundle) -> Result<()>;
}

/// In-memory bundle store, keyed by patient identifier.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bundles: IndexMap<u32, ReportBundle>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored bundle for a patient, if any.
    pub fn get(&self, patient_id: u32) -> Option<&ReportBundle> {
        self.bundles.get(&patient_id)
    }

    /// Number of stored bundles.
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl StorageSink for MemoryStore {
    fn upsert(&mut self, bundle: &ReportBundle) -> Result<()> {
        let patient_id = bundle.patient.patient_id;
        if self.bundles.insert(patient_id, bundle.clone()).is_some() {
            log::debug!("Replaced stored bundle for patient {patient_id}");
        }
        Ok(())
    }
}
