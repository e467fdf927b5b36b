//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Library modules use specific error types via `thiserror`, while the
//! CLI uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors (e.g., [`LastFmError`]) for detailed handling
//! - Parameter validation happens at the query-facade boundary, so the
//!   aggregation code never sees malformed input
//!
//! Remote-fetch failures ([`Error::LastFm`]) are distinct from caller
//! mistakes ([`Error::InvalidParameter`], [`Error::UnsupportedUnit`]) so a
//! caller can tell "your request was bad" apart from "the upstream failed".

use crate::lastfm::LastFmError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Aggregates errors from all subsystems for unified handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed play event (unparseable timestamp)
    #[error("Invalid scrobble: {0}")]
    InvalidScrobble(String),

    /// Unrecognized aggregation granularity
    #[error("Unsupported unit type {unit}")]
    UnsupportedUnit { unit: String },

    /// Caller-supplied query parameter missing or malformed
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Remote last.fm error (user lookup or fetch)
    #[error("last.fm error: {0}")]
    LastFm(#[from] LastFmError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid scrobble error.
    pub fn invalid_scrobble(message: impl Into<String>) -> Self {
        Self::InvalidScrobble(message.into())
    }

    /// Create an unsupported unit error naming the offending string.
    pub fn unsupported_unit(unit: impl Into<String>) -> Self {
        Self::UnsupportedUnit { unit: unit.into() }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error was caused by the caller's request rather than
    /// an upstream or internal failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidScrobble(_)
                | Self::UnsupportedUnit { .. }
                | Self::InvalidParameter { .. }
                | Self::LastFm(LastFmError::UserNotFound(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_unit_names_the_unit() {
        let err = Error::unsupported_unit("fortnights");
        assert!(err.to_string().contains("fortnights"));
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = Error::invalid_parameter("start", "failed to parse date");
        let msg = err.to_string();
        assert!(msg.contains("start"));
        assert!(msg.contains("failed to parse date"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::unsupported_unit("fortnights").is_client_error());
        assert!(Error::LastFm(LastFmError::UserNotFound("nobody".into())).is_client_error());
        assert!(!Error::LastFm(LastFmError::Network("timeout".into())).is_client_error());
    }
}
