//! Process-wide cache of open databases keyed by path
//!
//! Holds `Weak` references so the registry never keeps a database alive on
//! its own. A path whose last `Arc` was dropped is reopened on next connect.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Weak};

use tokio::sync::Mutex;
use tracing::trace;

use crate::Result;
use crate::database::SqliteDatabase;

static DATABASES: LazyLock<Mutex<HashMap<PathBuf, Weak<SqliteDatabase>>>> =
   LazyLock::new(|| Mutex::new(HashMap::new()));

/// Returns true for paths SQLite treats as in-memory databases
pub(crate) fn is_memory_database(path: &Path) -> bool {
   let text = path.to_string_lossy();
   text == ":memory:" || text.contains("mode=memory")
}

fn registry_key(path: &Path) -> PathBuf {
   std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Return the cached database for `path`, or open and cache a new one
///
/// The registry lock is held while `open` runs so two concurrent connects to
/// the same path cannot both open it.
pub(crate) async fn get_or_open_database<F, Fut>(path: &Path, open: F) -> Result<Arc<SqliteDatabase>>
where
   F: FnOnce() -> Fut,
   Fut: Future<Output = Result<SqliteDatabase>>,
{
   let key = registry_key(path);
   let mut databases = DATABASES.lock().await;

   if let Some(existing) = databases.get(&key).and_then(Weak::upgrade) {
      trace!(path = %key.display(), "Reusing cached database");
      return Ok(existing);
   }

   let db = Arc::new(open().await?);
   databases.insert(key.clone(), Arc::downgrade(&db));
   trace!(path = %key.display(), "Cached new database");

   Ok(db)
}

/// Forget the cached entry for `path`
pub(crate) async fn uncache_database(path: &Path) -> Result<()> {
   let key = registry_key(path);
   DATABASES.lock().await.remove(&key);
   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_memory_paths_detected() {
      assert!(is_memory_database(Path::new(":memory:")));
      assert!(is_memory_database(Path::new("file:pets?mode=memory&cache=shared")));
      assert!(!is_memory_database(Path::new("shelter.db")));
   }

   #[test]
   fn test_relative_keys_are_absolute() {
      assert!(registry_key(Path::new("shelter.db")).is_absolute());
   }
}
