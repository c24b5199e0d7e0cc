//! In-memory session store

use std::collections::HashMap;

use parking_lot::Mutex;
use zeroize::Zeroize;

use vigil_core::store::keys;
use vigil_core::{SessionRecord, SessionStore};

/// Session store held entirely in memory
///
/// Values are zeroized when the store is cleared or dropped.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
    clears: Mutex<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a freshly logged-in session
    pub fn insert(&self, record: &SessionRecord) -> vigil_core::Result<()> {
        let entries = record.to_entries()?;
        let mut map = self.entries.lock();
        for (key, value) in entries {
            if let Some(mut old) = map.insert(key.to_string(), value) {
                old.zeroize();
            }
        }
        Ok(())
    }

    /// Set a single raw value
    pub fn set(&self, key: &str, value: impl Into<String>) {
        if let Some(mut old) = self.entries.lock().insert(key.to_string(), value.into()) {
            old.zeroize();
        }
    }

    /// How many times `clear` has been called
    pub fn clears(&self) -> usize {
        *self.clears.lock()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn clear(&self) -> vigil_core::Result<()> {
        let mut map = self.entries.lock();
        for key in keys::ALL {
            if let Some(mut value) = map.remove(key) {
                value.zeroize();
            }
        }
        *self.clears.lock() += 1;
        Ok(())
    }
}

impl Drop for MemorySessionStore {
    fn drop(&mut self) {
        for value in self.entries.get_mut().values_mut() {
            value.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord {
            token: "h.p.s".to_string(),
            user_id: "7".to_string(),
            username: "bob".to_string(),
            roles: vec!["ROLE_MANAGER".to_string()],
            customer_id: Some("C-100".to_string()),
            email: None,
        }
    }

    #[test]
    fn test_insert_then_clear() {
        let store = MemorySessionStore::new();
        store.insert(&record()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.get(keys::CUSTOMER_ID).as_deref(), Some("C-100"));

        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!store.is_authenticated());
        assert!(store.auth_token().is_none());
        assert_eq!(store.clears(), 1);
    }

    #[test]
    fn test_clear_on_empty_store() {
        let store = MemorySessionStore::new();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.clears(), 2);
    }

    #[test]
    fn test_clear_keeps_unrelated_keys() {
        let store = MemorySessionStore::new();
        store.insert(&record()).unwrap();
        store.set("theme", "dark");
        store.clear().unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        for key in keys::ALL {
            assert!(store.get(key).is_none());
        }
    }
}
