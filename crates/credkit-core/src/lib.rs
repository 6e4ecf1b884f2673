//! Credkit Core - keyed credentials over the platform credential store
//!
//! This crate provides:
//! - Credentials: username, password and URL records addressed by key
//! - A reserved default slot and bulk removal
//! - Keystore bindings for macOS Keychain, Secret Service and Windows
//!   Credential Manager
//! - Config: serde-loadable store settings

#![forbid(unsafe_code)]

pub mod config;
pub mod credentials;

pub use config::StoreConfig;
pub use credentials::{
    Credentials, CredentialBackend, CredentialError, CredentialStore, Keystore, MemoryKeystore,
    Result, SecureString, Status, DEFAULT_CREDENTIALS_KEY,
};
