//! Linux Secret Service / Windows Credential Manager backend
//!
//! Both stores only hold a secret per (service, user) pair. Items and the
//! label index are laid out on top of that by [`IndexedKeystore`].
//!
//! [`IndexedKeystore`]: super::keyring_index::IndexedKeystore

use super::item::{ItemQuery, KeystoreItem};
use super::keystore::{Keystore, Status};

#[cfg(feature = "native-keyring")]
mod native {
    use crate::credentials::keyring_index::SecretEntries;
    use crate::credentials::keystore::Status;
    use keyring::Entry;
    use tracing::warn;

    fn map_error(e: keyring::Error) -> Status {
        match e {
            keyring::Error::NoEntry => Status::ITEM_NOT_FOUND,
            keyring::Error::NoStorageAccess(e) => {
                warn!(error = %e, "Keyring storage not accessible");
                Status::INTERACTION_NOT_ALLOWED
            }
            keyring::Error::PlatformFailure(e) => {
                warn!(error = %e, "Keyring platform failure");
                Status::IO
            }
            keyring::Error::BadEncoding(_) => Status::DECODE,
            keyring::Error::TooLong(..) | keyring::Error::Invalid(..) => Status::PARAM,
            keyring::Error::Ambiguous(_) => Status::DUPLICATE_ITEM,
            e => {
                warn!(error = %e, "Keyring error");
                Status::IO
            }
        }
    }

    /// `keyring` entries under one service name
    pub(super) struct ServiceEntries {
        pub(super) service: String,
    }

    impl ServiceEntries {
        fn entry(&self, user: &str) -> Result<Entry, Status> {
            Entry::new(&self.service, user).map_err(map_error)
        }
    }

    impl SecretEntries for ServiceEntries {
        fn get(&self, user: &str) -> Result<String, Status> {
            self.entry(user)?.get_password().map_err(map_error)
        }

        fn set(&self, user: &str, secret: &str) -> Result<(), Status> {
            self.entry(user)?.set_password(secret).map_err(map_error)
        }

        fn delete(&self, user: &str) -> Result<(), Status> {
            self.entry(user)?.delete_credential().map_err(map_error)
        }
    }
}

#[cfg(feature = "native-keyring")]
pub struct KeyringKeystore {
    inner: super::keyring_index::IndexedKeystore<native::ServiceEntries>,
}

#[cfg(feature = "native-keyring")]
impl KeyringKeystore {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let entries = native::ServiceEntries {
            service: service.into(),
        };
        Self {
            inner: super::keyring_index::IndexedKeystore::new(entries),
        }
    }
}

#[cfg(feature = "native-keyring")]
impl Keystore for KeyringKeystore {
    fn add(&self, item: &KeystoreItem) -> Result<(), Status> {
        self.inner.add(item)
    }

    fn update(&self, query: &ItemQuery, item: &KeystoreItem) -> Result<(), Status> {
        self.inner.update(query, item)
    }

    fn copy_matching(&self, query: &ItemQuery) -> Result<KeystoreItem, Status> {
        self.inner.copy_matching(query)
    }

    fn delete(&self, query: &ItemQuery) -> Result<(), Status> {
        self.inner.delete(query)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

/// Stand-in when built without `native-keyring`; every call reports
/// [`Status::NOT_AVAILABLE`].
#[cfg(not(feature = "native-keyring"))]
pub struct KeyringKeystore;

#[cfg(not(feature = "native-keyring"))]
impl KeyringKeystore {
    #[must_use]
    pub fn new(_service: impl Into<String>) -> Self {
        Self
    }
}

#[cfg(not(feature = "native-keyring"))]
impl Keystore for KeyringKeystore {
    fn add(&self, _item: &KeystoreItem) -> Result<(), Status> {
        Err(Status::NOT_AVAILABLE)
    }

    fn update(&self, _query: &ItemQuery, _item: &KeystoreItem) -> Result<(), Status> {
        Err(Status::NOT_AVAILABLE)
    }

    fn copy_matching(&self, _query: &ItemQuery) -> Result<KeystoreItem, Status> {
        Err(Status::NOT_AVAILABLE)
    }

    fn delete(&self, _query: &ItemQuery) -> Result<(), Status> {
        Err(Status::NOT_AVAILABLE)
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}
