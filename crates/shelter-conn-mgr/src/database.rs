//! SQLite database with connection pooling and lazy schema creation

use crate::Result;
use crate::config::SqliteDatabaseConfig;
use crate::error::Error;
use crate::registry::{get_or_open_database, is_memory_database, uncache_database};
use crate::schema::{SchemaHelper, SchemaOutcome, apply_schema};
use crate::write_guard::WriteGuard;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;
use tracing::{debug, error};

/// SQLite database with connection pooling for concurrent reads and exclusive writes.
///
/// Use [`open_for_read`](Self::open_for_read) and [`open_for_write`](Self::open_for_write)
/// for normal access: both make sure the schema described by the database's
/// [`SchemaHelper`] exists before returning. [`read_pool`](Self::read_pool) and
/// [`acquire_writer`](Self::acquire_writer) skip that step.
///
/// # Example
///
/// ```no_run
/// use shelter_conn_mgr::SqliteDatabase;
///
/// # async fn example() -> Result<(), shelter_conn_mgr::Error> {
/// let db = SqliteDatabase::connect("test.db", None).await?;
///
/// let mut writer = db.acquire_writer().await?;
/// sqlx::query("CREATE TABLE IF NOT EXISTS users (name TEXT)")
///     .execute(&mut *writer)
///     .await?;
/// drop(writer);
///
/// let rows = sqlx::query("SELECT * FROM users")
///     .fetch_all(db.read_pool()?)
///     .await?;
///
/// db.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteDatabase {
   /// Pool of read-only connections (defaults to max_connections=6) for concurrent reads
   read_pool: Pool<Sqlite>,

   /// Single read-write connection pool (max_connections=1) for serialized writes
   write_conn: Pool<Sqlite>,

   /// Tracks if WAL mode has been initialized (set on first write)
   wal_initialized: AtomicBool,

   /// Schema callbacks, applied at most once per instance
   schema: Option<Arc<dyn SchemaHelper>>,

   /// Result of applying `schema`, set on first open
   schema_outcome: OnceCell<Option<SchemaOutcome>>,

   /// Marks database as closed to prevent further operations
   closed: AtomicBool,

   /// Path to database file (used for cleanup and registry lookups)
   path: PathBuf,
}

impl SqliteDatabase {
   /// Connect to a SQLite database without a schema helper
   ///
   /// If the database is already connected, returns the existing instance.
   /// The file is created if it doesn't exist.
   ///
   /// # Arguments
   ///
   /// * `path` - Path to the SQLite database file (will be created if missing)
   /// * `custom_config` - Optional pool configuration. `None` uses the defaults
   ///   (6 max read connections, 30 second idle timeout).
   pub async fn connect(
      path: impl AsRef<Path>,
      custom_config: Option<SqliteDatabaseConfig>,
   ) -> Result<Arc<Self>> {
      Self::open(path.as_ref(), custom_config, None).await
   }

   /// Connect to a SQLite database whose schema is managed by `schema`
   ///
   /// Multiple calls with the same path return the same instance; the helper
   /// passed on the first call is the one that is used.
   ///
   /// # Examples
   ///
   /// ```no_run
   /// use shelter_conn_mgr::{SchemaHelper, SqliteDatabase};
   /// use std::sync::Arc;
   ///
   /// struct Empty;
   ///
   /// impl SchemaHelper for Empty {
   ///    fn version(&self) -> i64 { 1 }
   ///    fn on_create(&self) -> Vec<String> { Vec::new() }
   ///    fn on_upgrade(&self, _: i64, _: i64) -> Vec<String> { Vec::new() }
   /// }
   ///
   /// # async fn example() -> Result<(), shelter_conn_mgr::Error> {
   /// let db = SqliteDatabase::connect_with_schema("test.db", None, Arc::new(Empty)).await?;
   /// # Ok(())
   /// # }
   /// ```
   pub async fn connect_with_schema(
      path: impl AsRef<Path>,
      custom_config: Option<SqliteDatabaseConfig>,
      schema: Arc<dyn SchemaHelper>,
   ) -> Result<Arc<Self>> {
      Self::open(path.as_ref(), custom_config, Some(schema)).await
   }

   async fn open(
      path: &Path,
      custom_config: Option<SqliteDatabaseConfig>,
      schema: Option<Arc<dyn SchemaHelper>>,
   ) -> Result<Arc<Self>> {
      let config = custom_config.unwrap_or_default();

      if path.as_os_str().is_empty() {
         return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Database path cannot be empty",
         )));
      }

      if is_memory_database(path) {
         return Err(Error::MemoryDatabase(path.display().to_string()));
      }

      let path = path.to_path_buf();

      get_or_open_database(&path, || async {
         // The read pool is read-only and cannot create the file, so a
         // throwaway read-write connection creates it first
         if !path.exists() {
            let create_options = SqliteConnectOptions::new()
               .filename(&path)
               .create_if_missing(true)
               .read_only(false);

            let conn = create_options.connect().await?;
            drop(conn);
            debug!(path = %path.display(), "Created database file");
         }

         let read_options = SqliteConnectOptions::new().filename(&path).read_only(true);

         let read_pool = SqlitePoolOptions::new()
            .max_connections(config.max_read_connections)
            .min_connections(0)
            .idle_timeout(Some(std::time::Duration::from_secs(
               config.idle_timeout_secs,
            )))
            .connect_with(read_options)
            .await?;

         let write_options = SqliteConnectOptions::new().filename(&path).read_only(false);

         let write_conn = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .idle_timeout(Some(std::time::Duration::from_secs(
               config.idle_timeout_secs,
            )))
            .connect_with(write_options)
            .await?;

         Ok(Self {
            read_pool,
            write_conn,
            wal_initialized: AtomicBool::new(false),
            schema,
            schema_outcome: OnceCell::new(),
            closed: AtomicBool::new(false),
            path: path.clone(),
         })
      })
      .await
   }

   /// Path this database was opened with
   pub fn path(&self) -> &Path {
      &self.path
   }

   /// Apply the schema helper if that has not happened yet
   ///
   /// Returns `None` when the database has no schema helper. Concurrent first
   /// callers wait on the same initialization; later callers get the cached
   /// outcome without touching the database.
   pub async fn ensure_schema(&self) -> Result<Option<SchemaOutcome>> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::DatabaseClosed);
      }

      let outcome = self
         .schema_outcome
         .get_or_try_init(|| async {
            let Some(helper) = self.schema.as_deref() else {
               return Ok(None);
            };

            let mut writer = self.acquire_writer().await?;
            apply_schema(&mut writer, helper).await.map(Some)
         })
         .await?;

      Ok(*outcome)
   }

   /// Readable access to a database whose schema is guaranteed to exist
   pub async fn open_for_read(&self) -> Result<&Pool<Sqlite>> {
      self.ensure_schema().await?;
      self.read_pool()
   }

   /// Exclusive writable access to a database whose schema is guaranteed to exist
   pub async fn open_for_write(&self) -> Result<WriteGuard> {
      self.ensure_schema().await?;
      self.acquire_writer().await
   }

   /// Get a reference to the connection pool for executing read queries
   ///
   /// Does not apply the schema; see [`open_for_read`](Self::open_for_read).
   pub fn read_pool(&self) -> Result<&Pool<Sqlite>> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::DatabaseClosed);
      }
      Ok(&self.read_pool)
   }

   /// Acquire exclusive write access to the database
   ///
   /// On the first call, this method enables WAL mode on the database.
   /// Does not apply the schema; see [`open_for_write`](Self::open_for_write).
   pub async fn acquire_writer(&self) -> Result<WriteGuard> {
      if self.closed.load(Ordering::SeqCst) {
         return Err(Error::DatabaseClosed);
      }

      // max_connections=1 makes this exclusive
      let mut conn = self.write_conn.acquire().await?;

      if !self.wal_initialized.load(Ordering::SeqCst) {
         sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&mut *conn)
            .await?;

         // https://www.sqlite.org/wal.html#performance_considerations
         sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&mut *conn)
            .await?;

         self.wal_initialized.store(true, Ordering::SeqCst);
      }

      Ok(WriteGuard::new(conn))
   }

   /// Close the database and clean up resources
   ///
   /// Closes both pools and removes the database from the registry. Any
   /// further use of a retained handle returns `Error::DatabaseClosed`.
   pub async fn close(self: Arc<Self>) -> Result<()> {
      self.closed.store(true, Ordering::SeqCst);

      if let Err(e) = uncache_database(&self.path).await {
         error!("Failed to remove database from cache: {}", e);
      }

      // Waits for all readers to be returned
      self.read_pool.close().await;

      // Flush and truncate the WAL, only if a writer ever enabled it
      if self.wal_initialized.load(Ordering::SeqCst)
         && let Ok(mut conn) = self.write_conn.acquire().await
      {
         let _ = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&mut *conn)
            .await;
      }

      self.write_conn.close().await;

      Ok(())
   }

   /// Close the database and delete the database, WAL and SHM files
   pub async fn remove(self: Arc<Self>) -> Result<()> {
      let path = self.path.clone();

      self.close().await?;

      std::fs::remove_file(&path).map_err(Error::Io)?;

      // WAL and SHM files only exist if WAL was ever initialized
      for sidecar in [sidecar_path(&path, "-wal"), sidecar_path(&path, "-shm")] {
         if let Err(e) = std::fs::remove_file(&sidecar)
            && e.kind() != std::io::ErrorKind::NotFound
         {
            return Err(Error::Io(e));
         }
      }

      Ok(())
   }
}

impl std::fmt::Debug for SqliteDatabase {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("SqliteDatabase")
         .field("path", &self.path)
         .field("has_schema", &self.schema.is_some())
         .field("schema_outcome", &self.schema_outcome.get())
         .field("closed", &self.closed.load(Ordering::SeqCst))
         .finish()
   }
}

/// `shelter.db` -> `shelter.db-wal`
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
   let mut name = path.as_os_str().to_owned();
   name.push(suffix);
   PathBuf::from(name)
}
