use super::{EnvironmentMode, ValidatedLayoutPath};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCacheEntry {
    pub path: ValidatedLayoutPath,
    pub mode: EnvironmentMode,
}

/// Remembers layouts that were found on disk. Only positive results go in;
/// a missing or unreadable layout is probed again on the next request.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    inner: Arc<RwLock<HashMap<(EnvironmentMode, ValidatedLayoutPath), LayoutCacheEntry>>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mode: EnvironmentMode, path: &ValidatedLayoutPath) -> Option<LayoutCacheEntry> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&(mode, path.clone())).cloned()
    }

    /// Insert or replace; concurrent writers for one key all store the same value.
    pub fn insert_found(&self, mode: EnvironmentMode, path: ValidatedLayoutPath) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let entry = LayoutCacheEntry { path: path.clone(), mode };
        map.insert((mode, path), entry);
    }

    pub fn contains(&self, mode: EnvironmentMode, path: &ValidatedLayoutPath) -> bool {
        self.get(mode, path).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
