use std::collections::HashMap;

use crate::error::RegistryError;
use super::slice::{NetworkSlice, SliceId};

/// Pure entity storage for slices. Resource accounting lives in the
/// arbiter; the registry only owns the entities and their iteration order.
#[derive(Debug, Default)]
pub struct SliceRegistry {
    entries: HashMap<SliceId, NetworkSlice>,
    order: Vec<SliceId>,
}

impl SliceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slice: NetworkSlice) -> Result<(), RegistryError> {
        if self.entries.contains_key(&slice.id) {
            return Err(RegistryError::DuplicateId(slice.id));
        }
        self.order.push(slice.id);
        self.entries.insert(slice.id, slice);
        Ok(())
    }

    pub fn get(&self, id: &SliceId) -> Option<&NetworkSlice> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &SliceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn remove(&mut self, id: &SliceId) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        self.order.retain(|entry| entry != id);
        true
    }

    /// Applies an in-place mutation under exclusive access to the entry.
    pub fn update<F>(&mut self, id: &SliceId, mutate: F) -> Result<&NetworkSlice, RegistryError>
    where
        F: FnOnce(&mut NetworkSlice),
    {
        let slice = self
            .entries
            .get_mut(id)
            .ok_or(RegistryError::NotFound(*id))?;
        mutate(slice);
        Ok(slice)
    }

    /// Iterates slices in insertion order. Callers that iterate across
    /// mutations must snapshot first.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkSlice> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicing::slice::{IsolationLevel, QosSpec, ServiceType};

    fn sample_slice(name: &str) -> NetworkSlice {
        NetworkSlice::new(
            name.to_string(),
            QosSpec {
                latency_ms: 10.0,
                bandwidth_mbps: 100.0,
                reliability: 99.9,
                isolation_level: IsolationLevel::Shared,
            },
            ServiceType::Embb,
        )
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut registry = SliceRegistry::new();
        let slice = sample_slice("a");
        let dup = slice.clone();

        registry.insert(slice).unwrap();
        assert!(matches!(
            registry.insert(dup),
            Err(RegistryError::DuplicateId(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_absent_returns_false() {
        let mut registry = SliceRegistry::new();
        let slice = sample_slice("a");
        let id = slice.id;

        registry.insert(slice).unwrap();
        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn update_missing_entry_fails() {
        let mut registry = SliceRegistry::new();
        let ghost = sample_slice("ghost").id;
        assert!(matches!(
            registry.update(&ghost, |_| {}),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut registry = SliceRegistry::new();
        for name in ["a", "b", "c"] {
            registry.insert(sample_slice(name)).unwrap();
        }

        let names: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
