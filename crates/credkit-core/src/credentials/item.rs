//! Keystore item schema
//!
//! The attribute set every binding stores, and the conversions between it
//! and a [`Credentials`] record.

use super::record::Credentials;
use super::secure_string::SecureString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Item class. Everything this crate writes is a networked-service password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemClass {
    /// Username, secret and an associated server/protocol/path
    #[default]
    InternetPassword,
}

/// When a stored item may be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// Only while the device is unlocked
    #[default]
    WhenUnlocked,
    /// Any time after the first unlock following boot, including in the background
    AfterFirstUnlock,
}

/// Write-time protection policy handed to the binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemPolicy {
    pub accessibility: Accessibility,
    /// Eligible for cross-device replication
    pub synchronizable: bool,
}

impl ItemPolicy {
    /// Policy derived from a record's two flags
    #[must_use]
    pub fn from_flags(enable_cloud_sync: bool, enable_background_access: bool) -> Self {
        Self {
            accessibility: if enable_background_access {
                Accessibility::AfterFirstUnlock
            } else {
                Accessibility::WhenUnlocked
            },
            synchronizable: enable_cloud_sync,
        }
    }

    #[must_use]
    pub fn background_access(&self) -> bool {
        self.accessibility == Accessibility::AfterFirstUnlock
    }
}

/// Full attribute set of one stored item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreItem {
    pub class: ItemClass,
    /// External key of the item
    pub label: String,
    pub account: Option<String>,
    pub secret: SecureString,
    /// Host part of the service URL
    pub server: Option<String>,
    /// URL scheme, e.g. `https`
    pub protocol: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub policy: ItemPolicy,
}

impl KeystoreItem {
    /// Serialize a record under `label`
    #[must_use]
    pub fn from_credentials(credentials: &Credentials, label: &str) -> Self {
        let url = credentials.url.as_ref();
        Self {
            class: ItemClass::InternetPassword,
            label: label.to_string(),
            account: credentials.username.clone(),
            secret: credentials.password.clone(),
            server: url.and_then(|u| u.host_str()).map(str::to_string),
            protocol: url.map(|u| u.scheme().to_string()),
            port: url.and_then(Url::port),
            path: url
                .map(Url::path)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
            policy: ItemPolicy::from_flags(
                credentials.enable_cloud_sync,
                credentials.enable_background_access,
            ),
        }
    }

    /// Rebuild the record. The URL is reassembled from protocol, server,
    /// port and path; an item missing protocol or server has no URL.
    #[must_use]
    pub fn to_credentials(&self) -> Credentials {
        Credentials {
            username: self.account.clone(),
            password: self.secret.clone(),
            url: self.url(),
            enable_cloud_sync: self.policy.synchronizable,
            enable_background_access: self.policy.background_access(),
        }
    }

    fn url(&self) -> Option<Url> {
        let protocol = self.protocol.as_deref()?;
        let server = self.server.as_deref()?;
        let mut raw = format!("{protocol}://{server}");
        if let Some(port) = self.port {
            raw.push_str(&format!(":{port}"));
        }
        if let Some(path) = self.path.as_deref() {
            if !path.starts_with('/') {
                raw.push('/');
            }
            raw.push_str(path);
        }
        Url::parse(&raw).ok()
    }

    /// Whether this item is selected by `query`
    #[must_use]
    pub fn matches(&self, query: &ItemQuery) -> bool {
        self.class == query.class
            && query.label.as_deref().is_none_or(|l| l == self.label)
            && query
                .synchronizable
                .is_none_or(|s| s == self.policy.synchronizable)
    }
}

/// Lookup criteria
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemQuery {
    pub class: ItemClass,
    /// `None` selects every item of the class
    pub label: Option<String>,
    /// `None` matches both synchronizable and local items
    pub synchronizable: Option<bool>,
}

impl ItemQuery {
    /// The single item stored under `label`, whatever its sync state
    #[must_use]
    pub fn label(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::default()
        }
    }

    /// Every item of the class
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials::new("alice", "secret1")
            .with_url(Url::parse("https://example.com:8443/login").unwrap())
    }

    #[test]
    fn test_url_decomposed_into_attributes() {
        let item = KeystoreItem::from_credentials(&sample(), "svc1");

        assert_eq!(item.class, ItemClass::InternetPassword);
        assert_eq!(item.label, "svc1");
        assert_eq!(item.account.as_deref(), Some("alice"));
        assert_eq!(item.secret.expose(), "secret1");
        assert_eq!(item.protocol.as_deref(), Some("https"));
        assert_eq!(item.server.as_deref(), Some("example.com"));
        assert_eq!(item.port, Some(8443));
        assert_eq!(item.path.as_deref(), Some("/login"));
    }

    #[test]
    fn test_default_port_is_not_stored() {
        let creds = Credentials::new("alice", "pw")
            .with_url(Url::parse("https://example.com:443/").unwrap());
        let item = KeystoreItem::from_credentials(&creds, "k");
        assert_eq!(item.port, None);
    }

    #[test]
    fn test_url_reassembled() {
        let item = KeystoreItem::from_credentials(&sample(), "svc1");
        let back = item.to_credentials();
        assert_eq!(back.url, sample().url);
    }

    #[test]
    fn test_missing_server_yields_no_url() {
        let mut item = KeystoreItem::from_credentials(&sample(), "svc1");
        item.server = None;
        assert!(item.to_credentials().url.is_none());
    }

    #[test]
    fn test_policy_from_flags() {
        let policy = ItemPolicy::from_flags(false, false);
        assert_eq!(policy.accessibility, Accessibility::WhenUnlocked);
        assert!(!policy.synchronizable);

        let policy = ItemPolicy::from_flags(true, true);
        assert_eq!(policy.accessibility, Accessibility::AfterFirstUnlock);
        assert!(policy.synchronizable);
        assert!(policy.background_access());
    }

    #[test]
    fn test_query_matching() {
        let item = KeystoreItem::from_credentials(&sample().with_cloud_sync(true), "svc1");

        assert!(item.matches(&ItemQuery::label("svc1")));
        assert!(!item.matches(&ItemQuery::label("svc2")));
        assert!(item.matches(&ItemQuery::all()));

        let local_only = ItemQuery {
            synchronizable: Some(false),
            ..ItemQuery::label("svc1")
        };
        assert!(!item.matches(&local_only));
    }
}
