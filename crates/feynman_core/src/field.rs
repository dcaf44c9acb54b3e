//! crates/feynman_core/src/field.rs
//!
//! The draft field controller. Every text input of the wizard resolves its
//! starting value from the same three sources, in the same order:
//! navigation parameter, then the draft store, then a hardcoded default.

use std::sync::Arc;

use tracing::debug;

use crate::navigation::Location;
use crate::ports::DraftStore;
use crate::store::{self, StoreKey};

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Navigation,
    Store,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: ValueSource,
}

/// Picks the most authoritative of three candidate values.
///
/// A navigation parameter only counts when it is non-empty after trimming.
/// A stored value counts whenever it exists.
pub fn resolve_priority(param: Option<&str>, stored: Option<String>, default: &str) -> Resolved {
    if let Some(p) = param.map(str::trim).filter(|p| !p.is_empty()) {
        return Resolved {
            value: p.to_string(),
            source: ValueSource::Navigation,
        };
    }
    match stored {
        Some(value) => Resolved {
            value,
            source: ValueSource::Store,
        },
        None => Resolved {
            value: default.to_string(),
            source: ValueSource::Default,
        },
    }
}

/// A text input bound to one draft store key.
pub struct DraftField {
    key: StoreKey,
    value: String,
    source: ValueSource,
    store: Arc<dyn DraftStore>,
}

impl DraftField {
    /// Resolves the initial value. A present navigation parameter is written
    /// through to the store so the store reflects the most authoritative value.
    pub fn mount(
        store: Arc<dyn DraftStore>,
        key: StoreKey,
        param: Option<&str>,
        default: &str,
    ) -> Self {
        let resolved = resolve_priority(param, store::load(store.as_ref(), key), default);
        if resolved.source == ValueSource::Navigation {
            store::save(store.as_ref(), key, &resolved.value);
        }
        debug!(
            "Mounted field '{}' from {:?}",
            key.as_str(),
            resolved.source
        );
        Self {
            key,
            value: resolved.value,
            source: resolved.source,
            store,
        }
    }

    /// Mounts using the first present parameter among `names`.
    pub fn mount_from(
        store: Arc<dyn DraftStore>,
        key: StoreKey,
        location: &Location,
        names: &[&str],
        default: &str,
    ) -> Self {
        let param = names.iter().find_map(|name| location.present_param(name));
        Self::mount(store, key, param, default)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> ValueSource {
        self.source
    }

    pub fn key(&self) -> StoreKey {
        self.key
    }

    /// Applies one user edit and writes it through immediately.
    pub fn edit(&mut self, value: impl Into<String>) {
        self.value = value.into();
        store::save(self.store.as_ref(), self.key, &self.value);
    }
}
