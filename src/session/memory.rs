//! In-memory [`SessionStore`] with cookie-jar semantics.

use super::store::{CookieAttributes, SessionStore, StoreError, check};
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    path: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Entry>,
    read_only: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, for exercising failure containment.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }

    /// Insert a raw value, bypassing validation, as a tampered browser would.
    pub fn insert_raw(&mut self, name: &str, value: &str) {
        self.entries.insert(
            name.to_string(),
            Entry {
                value: value.to_string(),
                path: "/".to_string(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.expires_at > Instant::now())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, name: &str) -> Option<String> {
        self.entries
            .get(name)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    fn set(
        &mut self,
        name: &str,
        value: &str,
        attributes: &CookieAttributes,
    ) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        check(name, value, attributes)?;

        if attributes.max_age.is_zero() {
            self.entries.remove(name);
            return Ok(());
        }

        self.entries.insert(
            name.to_string(),
            Entry {
                value: value.to_string(),
                path: attributes.path.clone(),
                expires_at: Instant::now() + attributes.max_age,
            },
        );
        Ok(())
    }

    fn remove(&mut self, name: &str, attributes: &CookieAttributes) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let path_matches = self
            .entries
            .get(name)
            .is_some_and(|entry| entry.path == attributes.path);
        if path_matches {
            self.entries.remove(name);
        } else if self.entries.contains_key(name) {
            debug!(
                "ignoring removal of {name} with path {}; stored path differs",
                attributes.path
            );
        }
        Ok(())
    }
}
