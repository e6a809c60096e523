//! Common error types for the Pigeon workers.
//!
//! The campaign sender and the open tracker interact with recipient
//! files, template files, SMTP servers and an SQLite store. This module
//! consolidates the setup-time failures into a single [`Error`] enum so
//! that callers can use a simple `Result<T, Error>` without relying on
//! panicking calls like `unwrap` or `expect`.
//!
//! Per-recipient delivery problems are not errors: they are reported as
//! [`crate::domain::SendOutcome`] values and never abort a campaign.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running the workers.
#[derive(Debug, Error)]
pub enum Error {
    /// A recipient record is malformed or the recipient file is unreadable.
    #[error("recipient source error: {0}")]
    RecipientSource(String),

    /// CSV decoding failures while reading recipients.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A template file could not be read or decoded.
    #[error("cannot read template {}: {reason}", path.display())]
    TemplateRead { path: PathBuf, reason: String },

    /// Persistence layer failures.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Errors while constructing the database pool.
    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// Problems with environment or configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Settings file or environment could not be parsed.
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// Socket and filesystem failures.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the open event store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query or connection failures reported by Diesel.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// Stored data violates a domain constraint.
    #[error("validation error: {0}")]
    ValidationError(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
