//! Binding seam between the façade and a platform credential store
//!
//! A binding speaks in raw status codes. Translating those into
//! [`CredentialError`](super::CredentialError) is the façade's job, so every
//! binding reports failures the same way regardless of platform.

use super::item::{ItemQuery, KeystoreItem};
use std::fmt;

/// Non-zero status reported by a keystore binding.
///
/// Codes follow the Security framework `OSStatus` numbering so that failures
/// from the macOS keychain pass through verbatim and other bindings map onto
/// the same vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    /// No item matched the query (`errSecItemNotFound`)
    pub const ITEM_NOT_FOUND: Status = Status(-25300);
    /// An item with the same label already exists (`errSecDuplicateItem`)
    pub const DUPLICATE_ITEM: Status = Status(-25299);
    /// The store rejected an attribute (`errSecParam`)
    pub const PARAM: Status = Status(-50);
    /// No store is available on this platform or build (`errSecNotAvailable`)
    pub const NOT_AVAILABLE: Status = Status(-25291);
    /// The store is locked or needs user interaction (`errSecInteractionNotAllowed`)
    pub const INTERACTION_NOT_ALLOWED: Status = Status(-25308);
    /// Authorization was refused (`errSecAuthFailed`)
    pub const AUTH_FAILED: Status = Status(-25293);
    /// Stored data could not be decoded (`errSecDecode`)
    pub const DECODE: Status = Status(-26275);
    /// Lower-level I/O failure (`errSecIO`)
    pub const IO: Status = Status(-36);

    /// Wrap a raw code reported by a platform store
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// Raw numeric code
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[must_use]
    pub fn is_not_found(self) -> bool {
        self == Self::ITEM_NOT_FOUND
    }

    /// Short description of well-known codes
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ITEM_NOT_FOUND => "item not found",
            Self::DUPLICATE_ITEM => "duplicate item",
            Self::PARAM => "invalid attribute",
            Self::NOT_AVAILABLE => "credential store not available",
            Self::INTERACTION_NOT_ALLOWED => "credential store is locked",
            Self::AUTH_FAILED => "authorization failed",
            Self::DECODE => "stored item could not be decoded",
            Self::IO => "I/O error",
            _ => "unrecognized status",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

/// Attribute-addressed item store.
///
/// Implementations must be safe to call from several threads at once to the
/// same extent as the platform API they wrap. Each call is one blocking round
/// trip; bindings keep no cache.
#[cfg_attr(test, mockall::automock)]
pub trait Keystore: Send + Sync {
    /// Insert a new item. Fails with [`Status::DUPLICATE_ITEM`] when an item
    /// with the same label already exists.
    fn add(&self, item: &KeystoreItem) -> Result<(), Status>;

    /// Replace the attributes of the single item matching `query`.
    fn update(&self, query: &ItemQuery, item: &KeystoreItem) -> Result<(), Status>;

    /// Fetch the full attribute set of the single item matching `query`.
    fn copy_matching(&self, query: &ItemQuery) -> Result<KeystoreItem, Status>;

    /// Delete every item matching `query`. A query without a label matches all
    /// items of its class in this binding's scope. Fails with
    /// [`Status::ITEM_NOT_FOUND`] when nothing matched.
    fn delete(&self, query: &ItemQuery) -> Result<(), Status>;

    /// Binding name for logs
    fn name(&self) -> &'static str;
}
