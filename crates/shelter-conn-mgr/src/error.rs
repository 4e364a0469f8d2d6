//! Error types for shelter-conn-mgr

use thiserror::Error;

/// Errors that may occur when opening or using a shelter database
#[derive(Error, Debug)]
pub enum Error {
   /// IO error when accessing database files. Standard library IO errors
   /// are converted to this variant.
   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   /// Error from the sqlx library. Standard sqlx errors are converted to this variant
   #[error("Sqlx error: {0}")]
   Sqlx(#[from] sqlx::Error),

   /// In-memory databases are private to each connection, so the read pool
   /// would never see what the writer stores
   #[error("In-memory databases are not supported: {0}")]
   MemoryDatabase(String),

   /// Database has been closed and cannot be used
   #[error("Database has been closed")]
   DatabaseClosed,

   /// The file on disk carries a newer schema than this build understands
   #[error("Cannot downgrade database schema from version {current} to {requested}")]
   SchemaDowngrade { current: i64, requested: i64 },

   /// A schema helper asked for a version below 1
   #[error("Invalid schema version {0}: versions start at 1")]
   InvalidSchemaVersion(i64),
}
