//! SQLite storage for Ideagram
//!
//! ## Architecture
//!
//! - `schema.rs` holds the DDL and schema version
//! - `diesel_schema.rs` mirrors the tables for the query builder
//! - `models.rs` holds row, insert and changeset structs
//! - one repository module per aggregate, each function takes
//!   `&mut SqliteConnection` so callers decide the transaction boundary
//!
//! Connections come from an r2d2 pool. Foreign keys are switched on for
//! every connection the pool hands out.

pub mod schema;
pub mod diesel_schema;
pub mod models;

pub mod users;
pub mod profiles;
pub mod followings;
pub mod ideas;
pub mod steps;
pub mod engagement;
pub mod collaboration;
pub mod catalog;
pub mod reports;
pub mod emails;

use std::path::Path;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use tracing::{debug, info};

use crate::types::IdeagramError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection PRAGMAs
#[derive(Debug, Clone, Copy)]
struct ConnectionSetup;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionSetup {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Pooled SQLite database
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open or create the database file and apply the schema
    pub fn open(path: &Path) -> Result<Self, IdeagramError> {
        info!("Opening SQLite database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(10))
            .connection_customizer(Box::new(ConnectionSetup))
            .build(manager)
            .map_err(|e| IdeagramError::Database(format!("Failed to build pool: {}", e)))?;

        let db = Self { pool };
        db.with_conn(|conn| {
            conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")
                .map_err(|e| IdeagramError::Database(format!("Failed to set PRAGMA: {}", e)))?;
            schema::init_schema(conn)
        })?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    ///
    /// The pool holds exactly one connection that never expires, otherwise
    /// each new connection would see an empty database.
    pub fn open_in_memory() -> Result<Self, IdeagramError> {
        debug!("Opening in-memory SQLite database");

        let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
        let pool = Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connection_customizer(Box::new(ConnectionSetup))
            .build(manager)
            .map_err(|e| IdeagramError::Database(format!("Failed to build pool: {}", e)))?;

        let db = Self { pool };
        db.with_conn(schema::init_schema)?;

        Ok(db)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<PooledConn, IdeagramError> {
        Ok(self.pool.get()?)
    }

    /// Run a read with a pooled connection
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, IdeagramError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, IdeagramError>,
    {
        let mut conn = self.conn()?;
        f(&mut conn)
    }

    /// Run `f` inside a single transaction, rolled back on any error
    pub fn transaction<F, T>(&self, f: F) -> Result<T, IdeagramError>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T, IdeagramError>,
    {
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.transaction::<T, IdeagramError, _>(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_persists_between_calls() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.batch_execute("INSERT INTO classifications (id, title) VALUES ('c1', 'music')")
                .map_err(|e| IdeagramError::Database(e.to_string()))
        })
        .unwrap();

        let found = db
            .with_conn(|conn| catalog::list_classifications(conn))
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_transaction_rolls_back() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<(), IdeagramError> = db.transaction(|conn| {
            catalog::create_classification(conn, "music")?;
            Err(IdeagramError::Internal("boom".into()))
        });
        assert!(result.is_err());

        let found = db
            .with_conn(|conn| catalog::list_classifications(conn))
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ideagram.db");
        let db = Database::open(&path).unwrap();
        db.with_conn(|conn| catalog::create_classification(conn, "art"))
            .unwrap();
        drop(db);

        let reopened = Database::open(&path).unwrap();
        let found = reopened
            .with_conn(|conn| catalog::list_classifications(conn))
            .unwrap();
        assert_eq!(found[0].title, "art");
    }
}
