//! # shelter-conn-mgr
//!
//! Owns the single SQLite file behind the shelter catalog and guarantees its
//! schema exists before anyone reads or writes.
//!
//! ## Core Types
//!
//! - **[`SqliteDatabase`]**: Database handle with separate read and write connection pools
//! - **[`SqliteDatabaseConfig`]**: Configuration for connection pool settings
//! - **[`SchemaHelper`]**: Create/upgrade callbacks run once per database
//! - **[`WriteGuard`]**: RAII guard ensuring exclusive write access
//! - **[`Error`]**: Error type for database operations
//!
//! ## Architecture
//!
//! - **Connection pooling**: Separate read-only pool and write pool with a max of 1 connection
//! - **Lazy WAL mode**: Write-Ahead Logging enabled automatically on first write
//! - **Lazy schema**: `open_for_read()` / `open_for_write()` apply the [`SchemaHelper`]
//!   the first time either is called, and never again for that instance
//! - **Versioned schema**: the applied version lives in `PRAGMA user_version`
//!
//! ## Usage
//!
//! ```no_run
//! use shelter_conn_mgr::{SchemaHelper, SqliteDatabase};
//! use std::sync::Arc;
//!
//! struct Notes;
//!
//! impl SchemaHelper for Notes {
//!    fn version(&self) -> i64 {
//!       1
//!    }
//!
//!    fn on_create(&self) -> Vec<String> {
//!       vec!["CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT)".into()]
//!    }
//!
//!    fn on_upgrade(&self, _old_version: i64, _new_version: i64) -> Vec<String> {
//!       Vec::new()
//!    }
//! }
//!
//! #[tokio::main]
//! async fn main() -> shelter_conn_mgr::Result<()> {
//!     let db = SqliteDatabase::connect_with_schema("notes.db", None, Arc::new(Notes)).await?;
//!
//!     let mut writer = db.open_for_write().await?;
//!     sqlx::query("INSERT INTO notes (body) VALUES (?)")
//!         .bind("hello")
//!         .execute(&mut *writer)
//!         .await?;
//!     drop(writer);
//!
//!     let rows = sqlx::query("SELECT * FROM notes")
//!         .fetch_all(db.open_for_read().await?)
//!         .await?;
//!     assert_eq!(rows.len(), 1);
//!
//!     db.close().await?;
//!     Ok(())
//! }
//! ```
//!
mod config;
mod database;
mod error;
mod registry;
mod schema;
mod write_guard;

// Re-export public types
pub use config::SqliteDatabaseConfig;
pub use database::SqliteDatabase;
pub use error::Error;
pub use schema::{SchemaHelper, SchemaOutcome};
pub use write_guard::WriteGuard;

/// A type alias for Results with our custom Error type
pub type Result<T> = std::result::Result<T, Error>;
