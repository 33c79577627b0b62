//! Error types.
//!
//! `FetchError` is what every view receives when a dataset cannot be loaded.
//! `AppError` is what the binary reports: a message plus a process exit code.

use thiserror::Error;

use crate::domain::{DatasetKind, UserId};

/// Bad arguments, unparsable URLs, unusable configuration.
pub const EXIT_USAGE: u8 = 2;
/// The requested user has no record in the selected source.
pub const EXIT_NOT_FOUND: u8 = 3;
/// Network, decoding, or terminal failures.
pub const EXIT_DATA: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failure of a single dataset retrieval.
///
/// None of these are retried. A view that receives one renders its own error
/// state; the rest of the dashboard keeps working.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Request rejected, connection failed, unexpected status, or a body that
    /// is not JSON.
    #[error("network error: {0}")]
    Network(String),

    /// The source has no record for this user.
    #[error("no {kind} data for user {user}")]
    NotFound { kind: DatasetKind, user: UserId },

    /// A field whose value cannot be interpreted, e.g. a session length
    /// without any digits.
    #[error("malformed field `{field}`: {value:?}")]
    MalformedField { field: &'static str, value: String },

    /// The payload is JSON but not in the expected shape.
    #[error("could not decode {kind} payload: {message}")]
    Decode { kind: DatasetKind, message: String },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let code = if err.is_not_found() { EXIT_NOT_FOUND } else { EXIT_DATA };
        AppError::new(code, err.to_string())
    }
}
