//! Repository interfaces and Diesel-backed implementation.
//!
//! This module defines traits for reading and writing open events
//! alongside [`DieselRepository`], a small wrapper around a Diesel
//! connection pool.

use crate::db::{DbConnection, DbPool};
use crate::domain::{NewOpenEvent, OpenEvent};
use crate::errors::RepositoryResult;

pub mod open;

/// Concrete repository backed by a Diesel connection pool.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Creates a new [`DieselRepository`] from the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for open events.
pub trait OpenReader {
    /// Counts every open event committed so far.
    fn count_opens(&self) -> RepositoryResult<i64>;
}

/// Append-only write operations for open events.
pub trait OpenWriter {
    /// Stores a single open event and returns it with its assigned id.
    ///
    /// # Example
    /// ```no_run
    /// use chrono::Utc;
    /// use pushkind_pigeon::domain::NewOpenEvent;
    /// use pushkind_pigeon::repository::{DieselRepository, OpenWriter};
    /// # fn demo(repo: &DieselRepository) {
    /// let _ = repo.record_open(&NewOpenEvent {
    ///     email: None,
    ///     timestamp: Utc::now().naive_utc(),
    /// });
    /// # }
    /// ```
    fn record_open(&self, event: &NewOpenEvent) -> RepositoryResult<OpenEvent>;
}
