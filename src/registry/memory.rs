use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::{RegistryError, TaskRegistry};
use crate::kernel::record::{TaskId, TaskRecord};

/// Shared in-process registry. Clones are handles onto the same map, so an
/// embedding registrar keeps one clone and hands another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    entries: Arc<RwLock<BTreeMap<TaskId, TaskRecord>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = TaskRecord>) -> Self {
        let registry = Self::new();
        for record in records {
            registry.upsert(record);
        }
        registry
    }

    /// Registrar-side write.
    pub fn upsert(&self, record: TaskRecord) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(record.id, record);
    }

    /// Registrar-side delete.
    pub fn remove(&self, id: TaskId) -> Option<TaskRecord> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(&id)
    }

    pub fn contains(&self, id: TaskId) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskRegistry for InMemoryRegistry {
    fn snapshot(&self) -> Result<Vec<TaskRecord>, RegistryError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.values().cloned().collect())
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_by_id() {
        let registry = InMemoryRegistry::new();
        registry.upsert(TaskRecord::background(1, 3));
        registry.upsert(TaskRecord::background(1, 4));
        let records = registry.snapshot().unwrap();
        assert_eq!(records, vec![TaskRecord::background(1, 4)]);
    }

    #[test]
    fn clones_share_entries() {
        let registrar = InMemoryRegistry::new();
        let reader = registrar.clone();
        registrar.upsert(TaskRecord::background(5, 1));
        assert!(reader.contains(TaskId(5)));
        registrar.remove(TaskId(5));
        assert!(reader.is_empty());
    }
}
