use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelter_conn_mgr::SqliteDatabaseConfig;

use crate::contract::DATABASE_NAME;
use crate::{Error, Result};

/// Provider settings, loadable from a TOML file.
///
/// ```toml
/// database_path = "/var/lib/shelter/shelter.db"
/// channel_capacity = 64
///
/// [database]
/// max_read_connections = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
   /// Database file. Default: `shelter.db` in the working directory
   pub database_path: PathBuf,

   /// Connection pool settings
   pub database: SqliteDatabaseConfig,

   /// Buffer size of the change-notification stream channel
   ///
   /// Default: 256
   pub channel_capacity: usize,
}

impl Default for ProviderConfig {
   fn default() -> Self {
      Self {
         database_path: PathBuf::from(DATABASE_NAME),
         database: SqliteDatabaseConfig::default(),
         channel_capacity: 256,
      }
   }
}

impl ProviderConfig {
   /// Reads a config file; missing keys take their defaults.
   pub fn load(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path)?;
      toml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
   }

   pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
      self.database_path = path.into();
      self
   }
}
