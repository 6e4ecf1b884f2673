//! Store configuration
//!
//! Loaded by the binary from TOML and environment; the library only defines
//! the shape and its defaults.

use crate::credentials::{CredentialBackend, CredentialError, Result};
use serde::{Deserialize, Serialize};

/// Settings for a [`CredentialStore`](crate::CredentialStore)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: CredentialBackend,
    /// Keyring service name every entry is filed under
    pub service: String,
    /// Keychain creator code marking items written by this service
    pub creator: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::Auto,
            service: default_service(),
            creator: default_creator(),
        }
    }
}

fn default_service() -> String {
    "credkit".to_string()
}

fn default_creator() -> String {
    "cdkt".to_string()
}

impl StoreConfig {
    /// Reject settings no backend can work with
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(CredentialError::InvalidArgument(
                "service must not be empty".to_string(),
            ));
        }
        let printable = self
            .creator
            .chars()
            .all(|c| c.is_ascii_graphic() || c == ' ');
        if self.creator.len() != 4 || !printable {
            return Err(CredentialError::InvalidArgument(format!(
                "creator must be four ASCII characters, got {:?}",
                self.creator
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, CredentialBackend::Auto);
        assert_eq!(config.service, "credkit");
        assert_eq!(config.creator, "cdkt");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: StoreConfig = serde_json::from_str(r#"{"backend":"memory"}"#).unwrap();
        assert_eq!(config.backend, CredentialBackend::Memory);
        assert_eq!(config.service, "credkit");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_service = StoreConfig {
            service: "  ".to_string(),
            ..StoreConfig::default()
        };
        assert!(matches!(
            empty_service.validate(),
            Err(CredentialError::InvalidArgument(_))
        ));

        let long_creator = StoreConfig {
            creator: "credkit".to_string(),
            ..StoreConfig::default()
        };
        assert!(long_creator.validate().is_err());
    }
}
