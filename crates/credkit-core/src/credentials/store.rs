//! Credential store implementation

use super::backend::CredentialBackend;
use super::error::{lookup_error, CredentialError, Result};
use super::item::{ItemQuery, KeystoreItem};
use super::keystore::{Keystore, Status};
use super::record::Credentials;
use crate::config::StoreConfig;
use tracing::{debug, info, warn};
use url::Url;

/// Key of the single well-known credential slot
pub const DEFAULT_CREDENTIALS_KEY: &str = "credkit.default-credentials";

/// Keyed credentials over a platform keystore.
///
/// Every call goes straight to the keystore; nothing is cached, so two stores
/// over the same backend always observe each other's writes. Concurrent `set`
/// calls on one key all succeed and one of the written values wins.
pub struct CredentialStore {
    keystore: Box<dyn Keystore>,
}

impl CredentialStore {
    /// Create a new credential store with auto-detected backend
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&StoreConfig::default())
    }

    /// Create with a specific backend and default service settings
    #[must_use]
    pub fn with_backend(backend: CredentialBackend) -> Self {
        Self::from_config(&StoreConfig {
            backend,
            ..StoreConfig::default()
        })
    }

    /// Create an in-memory store (for testing)
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_backend(CredentialBackend::Memory)
    }

    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        let backend = config.backend.resolve();
        info!(backend = %backend, service = %config.service, "Initializing credential store");
        Self {
            keystore: backend.keystore(&config.service, &config.creator),
        }
    }

    /// Use a caller-provided binding
    #[must_use]
    pub fn with_keystore(keystore: impl Keystore + 'static) -> Self {
        Self {
            keystore: Box::new(keystore),
        }
    }

    /// Name of the active binding
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.keystore.name()
    }

    /// Fetch the credentials stored under `key`
    pub fn get(&self, key: &str) -> Result<Credentials> {
        validate_key(key)?;
        debug!(key = %key, backend = self.keystore.name(), "Retrieving credentials");

        self.keystore
            .copy_matching(&ItemQuery::label(key))
            .map(|item| item.to_credentials())
            .map_err(|status| lookup_error(key, status))
    }

    /// Store `credentials` under `key`, replacing whatever was there
    pub fn set(&self, credentials: &Credentials, key: &str) -> Result<()> {
        validate_key(key)?;
        if credentials.is_empty() {
            return Err(CredentialError::InvalidArgument(
                "credentials have neither username nor password".to_string(),
            ));
        }
        if let Some(url) = &credentials.url {
            validate_url(url)?;
        }
        debug!(key = %key, backend = self.keystore.name(), "Storing credentials");

        let query = ItemQuery::label(key);
        let item = KeystoreItem::from_credentials(credentials, key);

        let existing = match self.keystore.copy_matching(&query) {
            Ok(existing) => existing,
            Err(status) if status.is_not_found() => match self.keystore.add(&item) {
                // Another writer added it since the lookup
                Err(status) if status == Status::DUPLICATE_ITEM => {
                    debug!(key = %key, "Item appeared concurrently, replacing it");
                    self.keystore.copy_matching(&query)?
                }
                other => return Ok(other?),
            },
            Err(status) => return Err(status.into()),
        };

        if existing.policy.synchronizable == item.policy.synchronizable {
            return Ok(self.keystore.update(&query, &item)?);
        }

        // Synchronizability cannot be changed in place: replace the item.
        debug!(key = %key, synchronizable = item.policy.synchronizable, "Recreating item");
        self.keystore.delete(&query)?;
        if let Err(status) = self.keystore.add(&item) {
            if let Err(restore) = self.keystore.add(&existing) {
                warn!(key = %key, status = %restore, "Failed to restore previous credentials");
            }
            return Err(status.into());
        }
        Ok(())
    }

    /// Remove the credentials under `key`. Absent credentials are not an error.
    pub fn remove(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        debug!(key = %key, backend = self.keystore.name(), "Removing credentials");

        match self.keystore.delete(&ItemQuery::label(key)) {
            Err(status) if !status.is_not_found() => Err(status.into()),
            _ => Ok(()),
        }
    }

    /// Whether credentials exist under `key`
    pub fn contains(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(CredentialError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn get_default(&self) -> Result<Credentials> {
        self.get(DEFAULT_CREDENTIALS_KEY)
    }

    pub fn set_default(&self, credentials: &Credentials) -> Result<()> {
        self.set(credentials, DEFAULT_CREDENTIALS_KEY)
    }

    pub fn remove_default(&self) -> Result<()> {
        self.remove(DEFAULT_CREDENTIALS_KEY)
    }

    /// Remove every item this store has written, the default included
    pub fn remove_all(&self) -> Result<()> {
        info!(backend = self.keystore.name(), "Removing all credentials");

        match self.keystore.delete(&ItemQuery::all()) {
            Err(status) if !status.is_not_found() => Err(status.into()),
            _ => Ok(()),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CredentialError::InvalidArgument(
            "key must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Only scheme, host, port and path are stored, so anything else would be
/// silently lost on the way back.
fn validate_url(url: &Url) -> Result<()> {
    let invalid = |reason: &str| -> Result<()> {
        Err(CredentialError::InvalidArgument(format!("url {reason}")))
    };
    if url.host_str().is_none_or(str::is_empty) {
        return invalid("has no host");
    }
    if !url.username().is_empty() || url.password().is_some() {
        return invalid("must not carry user info");
    }
    if url.query().is_some() || url.fragment().is_some() {
        return invalid("must not carry a query or fragment");
    }
    Ok(())
}
