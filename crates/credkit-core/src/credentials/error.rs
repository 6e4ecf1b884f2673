//! Credential error types

use super::keystore::Status;
use thiserror::Error;

/// Credential store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Malformed caller input, rejected before the store is contacted
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No credentials are stored under the key
    #[error("Credentials not found: {0}")]
    NotFound(String),

    /// The platform store reported a failure
    #[error("Credential store error: {}", describe_status(.code))]
    Store {
        /// Raw status code as reported by the store
        code: i32,
    },
}

impl CredentialError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Store status behind a [`CredentialError::Store`]
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Store { code } => Some(Status::from_code(*code)),
            _ => None,
        }
    }
}

impl From<Status> for CredentialError {
    fn from(status: Status) -> Self {
        Self::Store {
            code: status.code(),
        }
    }
}

fn describe_status(code: &i32) -> Status {
    Status::from_code(*code)
}

/// Result type for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Map a lookup status, turning "not found" into [`CredentialError::NotFound`]
pub(crate) fn lookup_error(key: &str, status: Status) -> CredentialError {
    if status.is_not_found() {
        CredentialError::NotFound(key.to_string())
    } else {
        status.into()
    }
}
