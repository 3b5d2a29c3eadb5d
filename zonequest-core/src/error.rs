//! Error types for the ZoneQuest core library.
//!
//! Domain lookups never fail: unknown zones come back as `None`, empty
//! slices or `false`.  Only the storage backend, configuration loading,
//! timer scheduling and an exhausted NPC counter can produce a [`ZoneError`].

use thiserror::Error;

/// Top-level error type for all ZoneQuest operations.
#[derive(Error, Debug)]
pub enum ZoneError {
    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A capture search was started outside a Tokio runtime, so the delayed
    /// resolution could not be scheduled.
    #[error("No Tokio runtime available to schedule the capture timer")]
    NoRuntime,

    /// The lobby has handed out every NPC id it can represent.
    #[error("Lobby of zone {0} has no NPC ids left")]
    RosterFull(crate::types::ZoneId),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ZoneError>;
