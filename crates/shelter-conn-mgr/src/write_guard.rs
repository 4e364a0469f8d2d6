//! WriteGuard for exclusive write access to the database

use sqlx::Sqlite;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;
use std::ops::{Deref, DerefMut};

/// RAII guard for exclusive write access to a database connection
///
/// Wraps the single connection of the write pool and hands it back on drop.
/// Because the write pool holds at most one connection, only one `WriteGuard`
/// exists at a time and writes are serialized.
///
/// The guard derefs to `SqliteConnection`, so `&mut *guard` works directly
/// as a sqlx executor.
#[derive(Debug)]
pub struct WriteGuard {
   conn: PoolConnection<Sqlite>,
}

impl WriteGuard {
   pub(crate) fn new(conn: PoolConnection<Sqlite>) -> Self {
      Self { conn }
   }
}

impl Deref for WriteGuard {
   type Target = SqliteConnection;

   fn deref(&self) -> &Self::Target {
      &self.conn
   }
}

impl DerefMut for WriteGuard {
   fn deref_mut(&mut self) -> &mut Self::Target {
      &mut self.conn
   }
}
