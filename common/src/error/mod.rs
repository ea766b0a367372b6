//! Error types for the Trion backend
//!
//! This module provides a unified error handling system for the account
//! service and the API gateway. It defines the error kinds a caller can
//! observe and provides consistent error conversion.

use std::fmt::Display;
use thiserror::Error;

/// Backend error type
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or empty
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No account exists for the given identity
    #[error("User not found: {0}")]
    NotFound(String),

    /// The wheel was spun too recently
    #[error("Spin is on cooldown, next spin available in {}", format_remaining(.remaining))]
    CooldownActive {
        /// Time left until the next spin is allowed
        remaining: chrono::Duration,
    },

    /// A one-time or once-per-day reward was already granted
    #[error("Already claimed: {0}")]
    AlreadyClaimed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error means the persistence layer could not serve the call
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Error::Database(_) | Error::Migration(_))
    }

    /// Whether the error was caused by the caller rather than the backend
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::NotFound(_)
                | Error::CooldownActive { .. }
                | Error::AlreadyClaimed(_)
        )
    }
}

/// Render a cooldown as `5h 59m 30s`
fn format_remaining(remaining: &chrono::Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
                Error::InvalidArgument(msg) => Error::InvalidArgument(format!("{}: {}", context, msg)),
                Error::Configuration(msg) => Error::Configuration(format!("{}: {}", context, msg)),
                // Client-facing messages stay untouched
                Error::NotFound(identity) => Error::NotFound(identity),
                Error::AlreadyClaimed(what) => Error::AlreadyClaimed(what),
                Error::CooldownActive { remaining } => Error::CooldownActive { remaining },
                Error::Database(e) => Error::Database(e),
                Error::Migration(e) => Error::Migration(e),
                Error::Serialization(e) => Error::Serialization(e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_message_shows_remaining_time() {
        let err = Error::CooldownActive {
            remaining: chrono::Duration::seconds(5 * 3600 + 59 * 60 + 30),
        };
        assert_eq!(err.to_string(), "Spin is on cooldown, next spin available in 5h 59m 30s");

        let err = Error::CooldownActive { remaining: chrono::Duration::seconds(42) };
        assert_eq!(err.to_string(), "Spin is on cooldown, next spin available in 42s");
    }

    #[test]
    fn test_with_context_keeps_variant() {
        let result: Result<()> = Err(Error::Internal("boom".to_string()));
        let err = result.with_context(|| "Failed to load user").unwrap_err();
        assert_eq!(err.to_string(), "Internal error: Failed to load user: boom");

        let result: Result<()> = Err(Error::NotFound("u1".to_string()));
        let err = result.with_context(|| "Failed to load user").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref id) if id == "u1"));
    }

    #[test]
    fn test_classification() {
        assert!(Error::Database(sqlx::Error::PoolTimedOut).is_store_unavailable());
        assert!(!Error::NotFound("u1".to_string()).is_store_unavailable());
        assert!(Error::AlreadyClaimed("daily".to_string()).is_client_error());
        assert!(!Error::Internal("x".to_string()).is_client_error());
    }
}
