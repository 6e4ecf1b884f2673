//! Label index over a flat secret store
//!
//! Keyring-style stores only hold one secret per (service, user) pair. Each
//! item is kept as JSON in the secret of the user named after its label, and
//! the reserved [`INDEX_USER`] entry lists every label so that label-less
//! queries have something to enumerate.
//!
//! Every label that has an entry is listed in the index. The reverse does not
//! hold: a label may outlive its entry when an erase succeeds but the index
//! save after it fails, and readers skip such labels.

use super::item::{ItemClass, ItemPolicy, ItemQuery, KeystoreItem};
use super::keystore::{Keystore, Status};
use super::secure_string::SecureString;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Reserved user name of the label index
pub const INDEX_USER: &str = "__credkit_index__";

/// Flat (user → secret) storage under one service.
///
/// A missing user is reported as [`Status::ITEM_NOT_FOUND`].
pub(crate) trait SecretEntries: Send + Sync {
    fn get(&self, user: &str) -> Result<String, Status>;
    fn set(&self, user: &str, secret: &str) -> Result<(), Status>;
    fn delete(&self, user: &str) -> Result<(), Status>;
}

/// Serialized form of an item
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredItem {
    label: String,
    account: Option<String>,
    secret: String,
    server: Option<String>,
    protocol: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    #[zeroize(skip)]
    policy: ItemPolicy,
}

impl From<&KeystoreItem> for StoredItem {
    fn from(item: &KeystoreItem) -> Self {
        Self {
            label: item.label.clone(),
            account: item.account.clone(),
            secret: item.secret.expose().to_string(),
            server: item.server.clone(),
            protocol: item.protocol.clone(),
            port: item.port,
            path: item.path.clone(),
            policy: item.policy,
        }
    }
}

impl From<&StoredItem> for KeystoreItem {
    fn from(stored: &StoredItem) -> Self {
        Self {
            class: ItemClass::InternetPassword,
            label: stored.label.clone(),
            account: stored.account.clone(),
            secret: SecureString::new(stored.secret.as_str()),
            server: stored.server.clone(),
            protocol: stored.protocol.clone(),
            port: stored.port,
            path: stored.path.clone(),
            policy: stored.policy,
        }
    }
}

/// [`Keystore`] semantics on top of [`SecretEntries`]
pub(crate) struct IndexedKeystore<E> {
    entries: E,
}

impl<E: SecretEntries> IndexedKeystore<E> {
    pub(crate) fn new(entries: E) -> Self {
        Self { entries }
    }

    fn read(&self, label: &str) -> Result<KeystoreItem, Status> {
        let mut json = self.entries.get(label)?;
        let stored = serde_json::from_str::<StoredItem>(&json).map_err(|_| Status::DECODE);
        json.zeroize();
        Ok(KeystoreItem::from(&stored?))
    }

    fn write(&self, item: &KeystoreItem) -> Result<(), Status> {
        let mut json =
            serde_json::to_string(&StoredItem::from(item)).map_err(|_| Status::PARAM)?;
        let result = self.entries.set(&item.label, &json);
        json.zeroize();
        result
    }

    fn labels(&self) -> Result<Vec<String>, Status> {
        match self.entries.get(INDEX_USER) {
            Ok(json) => serde_json::from_str(&json).map_err(|_| Status::DECODE),
            Err(status) if status.is_not_found() => Ok(Vec::new()),
            Err(status) => Err(status),
        }
    }

    fn save_labels(&self, labels: &[String]) -> Result<(), Status> {
        if labels.is_empty() {
            return match self.entries.delete(INDEX_USER) {
                Err(status) if status.is_not_found() => Ok(()),
                other => other,
            };
        }
        let json = serde_json::to_string(labels).map_err(|_| Status::PARAM)?;
        self.entries.set(INDEX_USER, &json)
    }
}

impl<E: SecretEntries> Keystore for IndexedKeystore<E> {
    fn add(&self, item: &KeystoreItem) -> Result<(), Status> {
        if item.label == INDEX_USER {
            return Err(Status::PARAM);
        }
        match self.read(&item.label) {
            Ok(_) => return Err(Status::DUPLICATE_ITEM),
            Err(status) if status.is_not_found() => {}
            Err(status) => return Err(status),
        }

        let mut labels = self.labels()?;
        self.write(item)?;
        if labels.contains(&item.label) {
            return Ok(());
        }
        labels.push(item.label.clone());
        if let Err(status) = self.save_labels(&labels) {
            if let Err(erase) = self.entries.delete(&item.label) {
                warn!(label = %item.label, status = %erase, "Failed to roll back unindexed entry");
            }
            return Err(status);
        }
        Ok(())
    }

    fn update(&self, query: &ItemQuery, item: &KeystoreItem) -> Result<(), Status> {
        let existing = self.copy_matching(query)?;
        self.write(&KeystoreItem {
            label: existing.label,
            ..item.clone()
        })
    }

    fn copy_matching(&self, query: &ItemQuery) -> Result<KeystoreItem, Status> {
        match query.label.as_deref() {
            Some(INDEX_USER) => Err(Status::ITEM_NOT_FOUND),
            Some(label) => {
                let item = self.read(label)?;
                item.matches(query)
                    .then_some(item)
                    .ok_or(Status::ITEM_NOT_FOUND)
            }
            None => self
                .labels()?
                .iter()
                .filter_map(|label| self.read(label).ok())
                .find(|item| item.matches(query))
                .ok_or(Status::ITEM_NOT_FOUND),
        }
    }

    fn delete(&self, query: &ItemQuery) -> Result<(), Status> {
        let mut labels = self.labels()?;

        let targets: Vec<String> = match query.label.as_deref() {
            Some(INDEX_USER) => return Err(Status::ITEM_NOT_FOUND),
            Some(label) if query.synchronizable.is_none() => vec![label.to_string()],
            _ => labels
                .iter()
                .filter(|label| query.label.as_deref().is_none_or(|l| l == label.as_str()))
                .filter(|label| {
                    self.read(label)
                        .map(|item| item.matches(query))
                        .unwrap_or(query.synchronizable.is_none())
                })
                .cloned()
                .collect(),
        };

        let mut deleted = 0usize;
        for label in &targets {
            match self.entries.delete(label) {
                Ok(()) => deleted += 1,
                Err(status) if status.is_not_found() => {}
                Err(status) => return Err(status),
            }
        }

        labels.retain(|label| !targets.contains(label));
        self.save_labels(&labels)?;

        if deleted == 0 {
            return Err(Status::ITEM_NOT_FOUND);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}
