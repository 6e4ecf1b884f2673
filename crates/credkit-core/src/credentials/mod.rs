//! Credential Store - keyed username/password/URL records
//!
//! Records are kept in the platform credential store:
//! - macOS Keychain (internet-password items via `security`)
//! - Linux Secret Service (GNOME Keyring) through `keyring`
//! - Windows Credential Manager through `keyring`
//! - In-memory store for tests
//!
//! ## Security Features
//!
//! - **SecureString**: Uses `zeroize` crate for cryptographic memory wiping
//! - **OS Keychains**: Encryption and access control stay with the platform
//! - **Debug Safety**: Sensitive values are redacted in Debug output

#![forbid(unsafe_code)]

mod backend;
mod error;
mod item;
mod keychain;
#[cfg(any(feature = "native-keyring", test))]
mod keyring_index;
mod keystore;
mod memory;
mod native_keyring;
mod record;
mod secure_string;
mod store;


// Re-export all public types
pub use backend::CredentialBackend;
pub use error::{CredentialError, Result};
pub use item::{Accessibility, ItemClass, ItemPolicy, ItemQuery, KeystoreItem};
pub use keychain::KeychainKeystore;
pub use keystore::{Keystore, Status};
pub use memory::MemoryKeystore;
pub use native_keyring::KeyringKeystore;
pub use record::Credentials;
pub use secure_string::SecureString;
pub use store::{CredentialStore, DEFAULT_CREDENTIALS_KEY};
