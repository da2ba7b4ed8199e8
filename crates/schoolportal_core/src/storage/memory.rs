//! Tab-scoped storage area living only as long as its owner.

use super::{KeyValueStorage, StorageResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// In-process key-value area.
///
/// Clones are handles to the same map, so a store and a test can observe one
/// area. Not `Send`: the portal runs on one thread.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStorage;
    use crate::storage::KeyValueStorage;

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.set_item("currentUser", "{}").expect("set");
        assert_eq!(handle.get_item("currentUser").expect("get").as_deref(), Some("{}"));

        handle.clear().expect("clear");
        assert!(storage.is_empty());
    }
}
