//! Configuration for SQLite database connection pools

use serde::{Deserialize, Serialize};

/// Configuration for SqliteDatabase connection pools
///
/// # Examples
///
/// ```
/// use shelter_conn_mgr::SqliteDatabaseConfig;
///
/// // Use defaults
/// let config = SqliteDatabaseConfig::default();
///
/// // Override just one field
/// let config = SqliteDatabaseConfig {
///     max_read_connections: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteDatabaseConfig {
   /// Maximum number of concurrent read connections
   ///
   /// Default: 6
   pub max_read_connections: u32,

   /// Idle timeout for both read and write connections (in seconds)
   ///
   /// Connections that remain idle for this duration will be closed automatically.
   ///
   /// Default: 30
   pub idle_timeout_secs: u64,
}

impl Default for SqliteDatabaseConfig {
   fn default() -> Self {
      Self {
         max_read_connections: 6,
         idle_timeout_secs: 30,
      }
   }
}
