use civreg_core::db::migrations::latest_version;
use civreg_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

const REGISTRY_TABLES: &[&str] = &[
    "departments",
    "posts",
    "ranks",
    "scopes",
    "kinds",
    "siren_types",
    "hideout_types",
    "companies",
    "contacts",
    "phones",
    "emails",
];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in REGISTRY_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute("INSERT INTO scopes (name) VALUES ('city');", [])
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let scopes: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM scopes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(scopes, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn phones_fax_column_defaults_to_voice_and_rejects_other_flags() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO phones (company_id, phone) VALUES (1, 5551234);",
        [],
    )
    .unwrap();
    let fax: i64 = conn
        .query_row("SELECT fax FROM phones;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fax, 0);

    let err = conn.execute(
        "INSERT INTO phones (company_id, phone, fax) VALUES (1, 5551234, 2);",
        [],
    );
    assert!(err.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
