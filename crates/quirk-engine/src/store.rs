//! Item store interface
//!
//! The engine never owns device state. It reads configuration and
//! cross-referenced state through this interface and hands writes
//! back through it; persistence, timestamps and change notification
//! are the host's job. `read` returning `None` means the device
//! profile does not define that item — dependent rules are skipped,
//! never defaulted to zero.

use crate::model::ItemValue;
use dashmap::DashMap;

/// Read/write access to the host's semantic items
pub trait ItemStore: Send + Sync {
    /// Read an item; `None` when the profile does not define it
    fn read(&self, path: &str) -> Option<ItemValue>;

    /// Write an item (fire and forget)
    fn write(&self, path: &str, value: ItemValue);
}

/// In-memory item store
///
/// Safe to share across threads; used as-is by tests and small hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: DashMap<String, ItemValue>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the given items declared
    #[must_use]
    pub fn with_items<I, P>(items: I) -> Self
    where
        I: IntoIterator<Item = (P, ItemValue)>,
        P: Into<String>,
    {
        let store = Self::new();
        for (path, value) in items {
            store.items.insert(path.into(), value);
        }
        store
    }
}

impl ItemStore for MemoryStore {
    fn read(&self, path: &str) -> Option<ItemValue> {
        self.items.get(path).map(|v| v.clone())
    }

    fn write(&self, path: &str, value: ItemValue) {
        self.items.insert(path.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_item_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.read("config/offset"), None);
    }

    #[test]
    fn test_declared_item_round_trip() {
        let store = MemoryStore::with_items([("config/offset", ItemValue::Number(0.0))]);
        assert_eq!(store.read("config/offset"), Some(ItemValue::Number(0.0)));
        store.write("config/offset", ItemValue::Number(-50.0));
        assert_eq!(store.read("config/offset"), Some(ItemValue::Number(-50.0)));
    }
}
