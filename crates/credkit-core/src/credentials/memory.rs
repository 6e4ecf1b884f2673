//! In-process keystore
//!
//! Nothing survives the process. Items are unique by label and their
//! synchronizability is fixed at insert, as on the native stores. Other
//! platform primary-key rules are not modelled; the macOS keychain, for one,
//! also keys on account and URL, which `KeychainKeystore` covers by writing
//! the label into the item's security domain.

use super::item::{ItemQuery, KeystoreItem};
use super::keystore::{Keystore, Status};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct MemoryKeystore {
    items: RwLock<Vec<KeystoreItem>>,
}

fn handle_lock_poison<T>(_: PoisonError<T>) -> Status {
    Status::IO
}

impl MemoryKeystore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Keystore for MemoryKeystore {
    fn add(&self, item: &KeystoreItem) -> Result<(), Status> {
        let mut items = self.items.write().map_err(handle_lock_poison)?;
        if items
            .iter()
            .any(|existing| existing.class == item.class && existing.label == item.label)
        {
            return Err(Status::DUPLICATE_ITEM);
        }
        items.push(item.clone());
        Ok(())
    }

    fn update(&self, query: &ItemQuery, item: &KeystoreItem) -> Result<(), Status> {
        let mut items = self.items.write().map_err(handle_lock_poison)?;
        let existing = items
            .iter_mut()
            .find(|existing| existing.matches(query))
            .ok_or(Status::ITEM_NOT_FOUND)?;

        // Synchronizability is fixed when the item is created.
        if existing.policy.synchronizable != item.policy.synchronizable {
            return Err(Status::PARAM);
        }

        let label = existing.label.clone();
        *existing = KeystoreItem {
            label,
            ..item.clone()
        };
        Ok(())
    }

    fn copy_matching(&self, query: &ItemQuery) -> Result<KeystoreItem, Status> {
        let items = self.items.read().map_err(handle_lock_poison)?;
        items
            .iter()
            .find(|item| item.matches(query))
            .cloned()
            .ok_or(Status::ITEM_NOT_FOUND)
    }

    fn delete(&self, query: &ItemQuery) -> Result<(), Status> {
        let mut items = self.items.write().map_err(handle_lock_poison)?;
        let before = items.len();
        items.retain(|item| !item.matches(query));
        if items.len() == before {
            return Err(Status::ITEM_NOT_FOUND);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;

    fn item(label: &str, password: &str) -> KeystoreItem {
        KeystoreItem::from_credentials(&Credentials::new("user", password), label)
    }

    #[test]
    fn test_add_rejects_duplicate_label() {
        let store = MemoryKeystore::new();
        store.add(&item("a", "one")).unwrap();
        assert_eq!(store.add(&item("a", "two")), Err(Status::DUPLICATE_ITEM));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_label() {
        let store = MemoryKeystore::new();
        store.add(&item("a", "one")).unwrap();

        store
            .update(&ItemQuery::label("a"), &item("elsewhere", "two"))
            .unwrap();

        let stored = store.copy_matching(&ItemQuery::label("a")).unwrap();
        assert_eq!(stored.label, "a");
        assert_eq!(stored.secret.expose(), "two");
        assert!(store.copy_matching(&ItemQuery::label("elsewhere")).is_err());
    }

    #[test]
    fn test_update_refuses_sync_toggle() {
        let store = MemoryKeystore::new();
        store.add(&item("a", "one")).unwrap();

        let mut synced = item("a", "one");
        synced.policy.synchronizable = true;
        assert_eq!(
            store.update(&ItemQuery::label("a"), &synced),
            Err(Status::PARAM)
        );
    }

    #[test]
    fn test_update_missing() {
        let store = MemoryKeystore::new();
        assert_eq!(
            store.update(&ItemQuery::label("a"), &item("a", "x")),
            Err(Status::ITEM_NOT_FOUND)
        );
    }

    #[test]
    fn test_delete_all_and_not_found() {
        let store = MemoryKeystore::new();
        store.add(&item("a", "1")).unwrap();
        store.add(&item("b", "2")).unwrap();

        store.delete(&ItemQuery::all()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.delete(&ItemQuery::all()), Err(Status::ITEM_NOT_FOUND));
    }
}
