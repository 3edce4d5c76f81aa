//! Error type returned by every device request.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`NetworkError`] failures.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Failures talking to the device.
///
/// Callers only need to tell an unreachable device apart from one that answered
/// with an error status.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build device HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent, or the response body could not be read.
    #[error("device unreachable at `{path}`")]
    Unreachable {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The device answered with a non-success status code.
    #[error("device returned status {status} for `{path}`")]
    Status { path: String, status: StatusCode },
}

impl NetworkError {
    /// Status code returned by the device, when it answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::ClientBuilder { .. } | NetworkError::Unreachable { .. } => None,
        }
    }
}
