use crate::isochrone::{Isochrone, IsochroneKey};
use std::collections::HashMap;
use std::sync::Arc;

/// Content-addressed store of retrieved isochrones.
///
/// Entries live for the lifetime of the cache; nothing is evicted.
#[derive(Debug, Default)]
pub struct IsochroneCache {
    entries: HashMap<IsochroneKey, Arc<Isochrone>>,
}

impl IsochroneCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &IsochroneKey) -> Option<Arc<Isochrone>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &IsochroneKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores an isochrone under its own key, returning the shared handle.
    pub fn put(&mut self, isochrone: Isochrone) -> Arc<Isochrone> {
        let entry = Arc::new(isochrone);
        self.entries.insert(entry.key, entry.clone());
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &IsochroneKey> {
        self.entries.keys()
    }
}
