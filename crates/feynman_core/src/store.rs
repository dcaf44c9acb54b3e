//! crates/feynman_core/src/store.rs
//!
//! The persisted draft store: well-known keys, an in-memory implementation of
//! the `DraftStore` port, and the best-effort access helpers every screen uses.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::warn;

use crate::ports::{DraftStore, PortError, PortResult};

/// Keys of the per-session draft store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Topic,
    Explanation,
    Analogy,
    FileName,
    FileContent,
    FileId,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Topic => "topicName",
            StoreKey::Explanation => "simpleExp",
            StoreKey::Analogy => "analogyText",
            StoreKey::FileName => "uploadedFileName",
            StoreKey::FileContent => "uploadedFileContent",
            StoreKey::FileId => "uploadedFileId",
        }
    }
}

/// A `DraftStore` kept in process memory. Lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every entry, as when the user restarts from scratch.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

//=========================================================================================
// Best-effort access
//=========================================================================================
// Storage failures degrade the wizard to URL-only state; they are logged and
// never reach the user.

pub fn load(store: &dyn DraftStore, key: StoreKey) -> Option<String> {
    match store.get(key.as_str()) {
        Ok(value) => value,
        Err(e) => {
            warn!("Draft store read of '{}' failed: {}", key.as_str(), e);
            None
        }
    }
}

pub fn save(store: &dyn DraftStore, key: StoreKey, value: &str) {
    if let Err(e) = store.set(key.as_str(), value) {
        warn!("Draft store write of '{}' failed: {}", key.as_str(), e);
    }
}

pub fn forget(store: &dyn DraftStore, key: StoreKey) {
    if let Err(e) = store.remove(key.as_str()) {
        warn!("Draft store removal of '{}' failed: {}", key.as_str(), e);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A store whose every operation fails, like a browser with storage disabled.
    pub struct BrokenStore;

    impl DraftStore for BrokenStore {
        fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::Unavailable("storage disabled".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::Unavailable("storage disabled".into()))
        }
        fn remove(&self, _key: &str) -> PortResult<()> {
            Err(PortError::Unavailable("storage disabled".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::BrokenStore;
    use super::*;

    #[test]
    fn last_write_wins() {
        let store = MemoryDraftStore::new();
        for v in ["V", "V=", "V=I", "V=IR"] {
            save(&store, StoreKey::Explanation, v);
        }
        assert_eq!(load(&store, StoreKey::Explanation).as_deref(), Some("V=IR"));
    }

    #[test]
    fn broken_store_degrades_silently() {
        let store = BrokenStore;
        save(&store, StoreKey::Topic, "Capacitors");
        forget(&store, StoreKey::Topic);
        assert_eq!(load(&store, StoreKey::Topic), None);
    }

    #[test]
    fn clear_drops_everything() {
        let store = MemoryDraftStore::new();
        save(&store, StoreKey::Topic, "Inductors");
        save(&store, StoreKey::Analogy, "like a flywheel");
        store.clear();
        assert_eq!(load(&store, StoreKey::Topic), None);
        assert_eq!(load(&store, StoreKey::Analogy), None);
    }
}
