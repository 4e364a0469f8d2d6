use shelter_conn_mgr::SchemaHelper;
use tracing::warn;

use crate::contract::DATABASE_VERSION;

/// Table definition of the pet store.
pub const CREATE_PETS_TABLE: &str = "CREATE TABLE pets (\
   id INTEGER PRIMARY KEY AUTOINCREMENT, \
   name TEXT NOT NULL, \
   breed TEXT, \
   gender INTEGER NOT NULL, \
   weight INTEGER NOT NULL DEFAULT 0)";

/// Creates and upgrades the pet store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetDbHelper;

impl SchemaHelper for PetDbHelper {
   fn version(&self) -> i64 {
      DATABASE_VERSION
   }

   fn on_create(&self) -> Vec<String> {
      vec![CREATE_PETS_TABLE.to_string()]
   }

   fn on_upgrade(&self, old_version: i64, new_version: i64) -> Vec<String> {
      // Version 1 is the only schema, so there are no upgrade steps
      warn!(old_version, new_version, "No upgrade steps defined for the pet store");
      Vec::new()
   }
}
