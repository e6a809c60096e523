mod common;

use std::thread;

use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::sql_types::Integer;
use diesel::{QueryableByName, RunQueryDsl};
use pushkind_pigeon::domain::NewOpenEvent;
use pushkind_pigeon::repository::{OpenReader, OpenWriter};

#[derive(QueryableByName)]
struct SyncMode {
    #[diesel(sql_type = Integer)]
    synchronous: i32,
}

fn open_now(email: Option<&str>) -> NewOpenEvent<'_> {
    NewOpenEvent {
        email,
        timestamp: Utc::now().naive_utc(),
    }
}

#[test]
fn empty_store_counts_zero() {
    let test_db = common::TestDb::new("empty_store_counts_zero.db");
    let repo = test_db.repository();

    assert_eq!(repo.count_opens().unwrap(), 0);
}

#[test]
fn record_open_assigns_increasing_ids() {
    let test_db = common::TestDb::new("record_open_assigns_increasing_ids.db");
    let repo = test_db.repository();

    let first = repo.record_open(&open_now(None)).unwrap();
    let second = repo.record_open(&open_now(Some("a@x.com"))).unwrap();

    assert!(second.id > first.id);
    assert_eq!(first.email, None);
    assert_eq!(second.email.as_deref(), Some("a@x.com"));
    assert_eq!(repo.count_opens().unwrap(), 2);
}

#[test]
fn ensure_schema_keeps_existing_events() {
    let test_db = common::TestDb::new("ensure_schema_keeps_existing_events.db");
    let repo = test_db.repository();
    repo.record_open(&open_now(None)).unwrap();

    pushkind_pigeon::db::ensure_schema(&test_db.pool()).unwrap();

    assert_eq!(repo.count_opens().unwrap(), 1);
}

#[test]
fn concurrent_appends_are_not_lost() {
    let test_db = common::TestDb::new("concurrent_appends_are_not_lost.db");
    let repo = test_db.repository();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let repo = repo.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    repo.record_open(&open_now(None)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(repo.count_opens().unwrap(), 200);
}

#[test]
fn missing_table_is_a_repository_error() {
    let test_db = common::TestDb::new("missing_table_is_a_repository_error.db");
    let repo = test_db.repository();
    let mut conn = test_db.pool().get().unwrap();
    conn.batch_execute("DROP TABLE email_opens").unwrap();

    assert!(repo.count_opens().is_err());
    assert!(repo.record_open(&open_now(None)).is_err());

    // The connection is still usable afterwards.
    diesel::sql_query("SELECT 1").execute(&mut conn).unwrap();
}

#[test]
fn pooled_connections_sync_every_commit() {
    let test_db = common::TestDb::new("pooled_connections_sync_every_commit.db");
    let mut conn = test_db.pool().get().unwrap();

    let mode: SyncMode = diesel::sql_query("PRAGMA synchronous")
        .get_result(&mut conn)
        .unwrap();
    // 2 is FULL.
    assert_eq!(mode.synchronous, 2);
}
