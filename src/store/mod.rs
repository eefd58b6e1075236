//! Remote collection access.
//!
//! [`UserStore`] is the seam between the session and the collection resource.
//! Each call is a single request/response cycle with no retry.

#[cfg(test)]
pub mod memory;
pub mod remote;

use crate::user::{UserKey, UserPayload, UserRecord};

pub use remote::RemoteStore;

/// Why a store call did not produce a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request could not complete (DNS, connect, timeout, I/O)
    Network(String),
    /// The server answered with a non-success status
    Server { status: u16, body: String },
    /// The response body was not the expected JSON
    Parse(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Server { .. } => "server",
            Self::Parse(_) => "parse",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "request failed: {}", msg),
            Self::Server { status, body } if body.is_empty() => {
                write!(f, "server error {}", status)
            }
            Self::Server { status, body } => write!(f, "server error {}: {}", status, body),
            Self::Parse(msg) => write!(f, "invalid response: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Trait for the remote collection to allow mocking and abstraction
pub trait UserStore {
    /// List every record in the collection
    fn fetch_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Create a record; returns the server's response body
    fn create(&self, payload: &UserPayload) -> Result<UserRecord, StoreError>;

    /// Replace the record at `key`; returns the server's response body
    fn update(&self, key: UserKey, payload: &UserPayload) -> Result<UserRecord, StoreError>;

    fn delete(&self, key: UserKey) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Server {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "server error 404");
        assert_eq!(err.kind(), "server");

        let err = StoreError::Server {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "server error 500: boom");

        let err = StoreError::Parse("expected array".to_string());
        assert_eq!(err.to_string(), "invalid response: expected array");
    }
}
