//! Service-level error types
//!
//! These errors cover startup and infrastructure failures (configuration,
//! database bootstrap, socket I/O). Request handling uses
//! [`crate::handlers::ApiError`] instead.

use std::fmt;

use thiserror::Error;

/// Database operation being performed when an infrastructure error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Establishing the connection pool
    Connect,
    /// Creating the schema at startup
    Bootstrap,
    /// Running a health probe query
    Ping,
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Bootstrap => write!(f, "bootstrap"),
            Self::Ping => write!(f, "ping"),
        }
    }
}

/// Result type alias using the service [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Service error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Database error with the operation that failed
    #[error("Database error during {operation}: {source}")]
    Database {
        /// What the service was doing
        operation: DatabaseOperation,
        /// Underlying driver error
        #[source]
        source: sqlx::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a driver error with the operation it interrupted
    pub fn database(operation: DatabaseOperation, source: sqlx::Error) -> Self {
        Self::Database { operation, source }
    }
}

// figment errors are large; box them to keep `Result<T>` small
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

/// Sanitize a database URL by removing credentials
pub fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(scheme_end) = url.find("://") {
            if scheme_end < at_pos {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos + 1..];
                return format!("{}<redacted>@{}", scheme, after_at);
            }
        }
    }
    url.to_string()
}
