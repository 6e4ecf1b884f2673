//! Credential backend types

use super::keychain::KeychainKeystore;
use super::keystore::Keystore;
use super::memory::MemoryKeystore;
use super::native_keyring::KeyringKeystore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported credential backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// Automatic selection based on platform
    #[default]
    Auto,
    /// macOS Keychain
    Keychain,
    /// Linux Secret Service (D-Bus)
    SecretService,
    /// Windows Credential Manager
    WindowsCredential,
    /// In-memory only (for testing)
    Memory,
}

impl CredentialBackend {
    /// Detect the best backend for the current platform
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::Keychain
        }
        #[cfg(target_os = "windows")]
        {
            Self::WindowsCredential
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            Self::SecretService
        }
    }

    /// Resolve Auto to actual backend
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto => Self::detect(),
            other => other,
        }
    }

    /// Build the binding for this backend.
    ///
    /// `service` scopes keyring entries; `creator` is the keychain creator
    /// code stamped on every item.
    #[must_use]
    pub fn keystore(self, service: &str, creator: &str) -> Box<dyn Keystore> {
        match self.resolve() {
            Self::Keychain => Box::new(KeychainKeystore::new(creator)),
            Self::SecretService | Self::WindowsCredential => {
                Box::new(KeyringKeystore::new(service))
            }
            Self::Memory => Box::new(MemoryKeystore::new()),
            // resolve() never yields Auto
            Self::Auto => Box::new(KeyringKeystore::new(service)),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Keychain => "keychain",
            Self::SecretService => "secret_service",
            Self::WindowsCredential => "windows_credential",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto" => Ok(Self::Auto),
            "keychain" => Ok(Self::Keychain),
            "secret_service" => Ok(Self::SecretService),
            "windows_credential" => Ok(Self::WindowsCredential),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown credential backend: {other}")),
        }
    }
}
