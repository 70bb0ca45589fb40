// src/core/errors.rs

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a raw URL was rejected before any network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    EmptyInput,
    #[error("Invalid URL format")]
    MalformedUrl,
    #[error("Could not extract domain from URL")]
    NoHost,
}

/// Why the header probe could not produce a header map.
///
/// This never aborts an audit; it is embedded in the report instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderProbeError {
    #[error("Timeout - server took too long to respond")]
    Timeout,
    #[error("Connection error - unable to reach the server")]
    ConnectionError,
    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl HeaderProbeError {
    /// Classifies a transport failure from `reqwest`.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            HeaderProbeError::Timeout
        } else if err.is_connect() {
            HeaderProbeError::ConnectionError
        } else {
            HeaderProbeError::RequestFailed(err.to_string())
        }
    }
}

impl Serialize for HeaderProbeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Terminal failure of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("Audit failed: {0}")]
    Failed(String),
}

impl Serialize for AuditError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
