//! Helpers for integration tests.

use pushkind_pigeon::db::{DbPool, ensure_schema, establish_connection_pool};
use pushkind_pigeon::repository::DieselRepository;
use tempfile::TempDir;

/// Temporary database used in integration tests.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    #[allow(dead_code)]
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);
        let pool = establish_connection_pool(path.to_str().expect("Non UTF-8 temp path."))
            .expect("Failed to establish SQLite connection.");
        ensure_schema(&pool).expect("Failed to create schema.");
        TestDb { pool, _dir: dir }
    }

    #[allow(dead_code)]
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    #[allow(dead_code)]
    pub fn repository(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}
