//! Credential record

use super::secure_string::SecureString;
use url::Url;

/// Username, password and service URL stored under one key.
///
/// `enable_cloud_sync` and `enable_background_access` only affect how the
/// platform store protects the item when it is written. A store that cannot
/// report them back returns them as `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: SecureString,
    pub url: Option<Url>,
    /// Allow cross-device replication of the item
    pub enable_cloud_sync: bool,
    /// Allow reads while the device is locked
    pub enable_background_access: bool,
}

impl Credentials {
    /// Create a record with both username and password set
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: SecureString::new(password),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    #[must_use]
    pub fn with_cloud_sync(mut self, enabled: bool) -> Self {
        self.enable_cloud_sync = enabled;
        self
    }

    #[must_use]
    pub fn with_background_access(mut self, enabled: bool) -> Self {
        self.enable_background_access = enabled;
        self
    }

    /// Neither a username nor a password. Such a record is refused on write.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.as_deref().is_none_or(str::is_empty) && self.password.is_empty()
    }
}
