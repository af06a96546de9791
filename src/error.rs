//! Unified error types for Vitrina with fail-open philosophy.
//!
//! Search must never be blocked by its collaborators. Storage, matcher and
//! delivery failures are logged and replaced with safe defaults at the
//! public entry points rather than propagated to the caller.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Vitrina operations.
#[derive(Error, Debug)]
pub enum VitrinaError {
    /// I/O errors from history or config file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Catalog ingestion errors.
    #[error("catalog error: {message}")]
    Catalog { message: String },

    /// Failure while scoring a single term against the index.
    #[error("matcher error: {message}")]
    Matcher { message: String },

    /// Invalid input to the email-code verification flow.
    #[error("verification error: {message}")]
    Verification { message: String },

    /// The external message sender refused or failed a delivery.
    #[error("delivery error: {message}")]
    Delivery { message: String },
}

/// A specialized Result type for Vitrina operations.
pub type Result<T> = std::result::Result<T, VitrinaError>;

impl VitrinaError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a matcher error.
    pub fn matcher(message: impl Into<String>) -> Self {
        Self::Matcher {
            message: message.into(),
        }
    }

    /// Create a verification error.
    pub fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
        }
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

impl From<io::Error> for VitrinaError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for VitrinaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and carry on with a safe value.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the Vitrina CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command ran but reported a failure.
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
