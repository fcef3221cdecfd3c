use labnote_core::db::migrations::latest_version;
use labnote_core::db::{open_db, open_db_in_memory, DbError};
use labnote_core::store::EXPERIMENTS_KEY;
use labnote_core::{KvStore, LabRepository, SqliteKvStore, StoreError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_entries');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1);
}

#[test]
fn opening_same_file_twice_is_idempotent_and_keeps_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labnote.sqlite3");

    {
        let store = SqliteKvStore::open(&path).unwrap();
        store.set("greeting", "你好").unwrap();
    }

    let store = SqliteKvStore::open(&path).unwrap();
    assert_eq!(schema_version(store.connection()), latest_version());
    assert_eq!(store.get("greeting").unwrap().as_deref(), Some("你好"));
}

#[test]
fn opening_store_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match SqliteKvStore::open(&path) {
        Err(StoreError::Db(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        })) => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("newer schema must be rejected"),
    }
    assert!(matches!(
        open_db(&path),
        Err(DbError::UnsupportedSchemaVersion { .. })
    ));
}

#[test]
fn set_overwrites_and_remove_deletes() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    assert_eq!(store.get("k").unwrap(), None);

    store.set("k", "one").unwrap();
    store.set("k", "two").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));

    store.remove("k").unwrap();
    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn set_many_writes_every_entry() {
    let store = SqliteKvStore::open_in_memory().unwrap();
    store
        .set_many(&[("a", "[1]".to_string()), ("b", "[2]".to_string())])
        .unwrap();

    assert_eq!(store.get("a").unwrap().as_deref(), Some("[1]"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("[2]"));
}

#[test]
fn repository_data_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notebook.sqlite3");

    let project_id = {
        let repo = LabRepository::new(SqliteKvStore::open(&path).unwrap());
        let project = repo.create_project("蛋白纯化").unwrap();
        repo.create_experiment(project.id.as_str(), "Ni-NTA column")
            .unwrap();
        project.id
    };

    let repo = LabRepository::new(SqliteKvStore::open(&path).unwrap());
    assert_eq!(repo.list_projects()[0].name, "蛋白纯化");
    let experiments = repo.list_experiments(Some(project_id.as_str()));
    assert_eq!(experiments.len(), 1);
    assert_eq!(experiments[0].title, "Ni-NTA column");
    assert!(repo.store().get(EXPERIMENTS_KEY).unwrap().is_some());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}
