//! Persistent user store (users and access_tokens tables).
//!
//! The store is embedded SQLite behind a shared connection handle. Handlers
//! receive the handle through axum state rather than a process-wide global,
//! and acquire the connection per request via [`try_lock`].
//!
//! Schema changes go through version-gated migrations: each migration checks
//! the recorded schema version, runs once, and records the new version in the
//! `db_version` table.

pub mod tokens;
pub mod users;

use rusqlite::{Connection, Result, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use tokens::issue_token;
pub use users::{NewUser, User, create_user, get_user_by_email};

/// Shared store handle passed to all handlers
pub type StoreHandle = Arc<Mutex<Connection>>;

/// Current schema version for the accounts database.
/// Increment this when adding a new migration.
pub const STORE_VERSION: i32 = 1;

/// Error returned when the store lock cannot be acquired
#[derive(Debug)]
pub struct StoreLockError;

impl std::fmt::Display for StoreLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Store unavailable")
    }
}

impl std::error::Error for StoreLockError {}

/// Try to acquire the store lock, returning an error if poisoned
pub fn try_lock(store: &StoreHandle) -> std::result::Result<MutexGuard<'_, Connection>, StoreLockError> {
    store.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Store mutex poisoned - a thread panicked while holding the lock");
        StoreLockError
    })
}

/// Open (or create) the accounts database and bring the schema up to date
pub fn init_store(path: &Path) -> Result<StoreHandle> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Initialize the store schema with version-gated migrations
pub fn init_schema(conn: &Connection) -> Result<()> {
    // Bootstrap: ensure db_version table exists (needed to check version)
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS db_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL,
            description TEXT
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    tracing::debug!("accounts db schema version: {}", current_version);

    if current_version < 1 {
        migrate_v0_to_v1(conn)?;
    }

    Ok(())
}

/// v0→v1: Create base tables (users, access_tokens)
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    tracing::info!("Running migration v0→v1: Create base tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            identifier_token TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            name TEXT,
            hashed_password TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS access_tokens (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            token TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_access_tokens_user_id ON access_tokens(user_id);
        "#,
    )?;

    record_version(conn, 1, "Create base tables (users, access_tokens)")?;
    Ok(())
}

/// Record that a migration ran
fn record_version(conn: &Connection, version: i32, description: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO db_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        params![version, chrono::Utc::now().to_rfc3339(), description],
    )?;
    Ok(())
}

/// Get the current schema version (0 for a fresh database)
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM db_version",
        [],
        |row| row.get(0),
    )
}

#[cfg(test)]
pub(crate) fn open_test_store() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    init_schema(&conn).expect("init schema");
    conn
}
