//! Versioned schema creation and upgrade

use sqlx::Connection;
use sqlx::sqlite::SqliteConnection;
use tracing::{debug, info};

use crate::Result;
use crate::error::Error;

/// Describes how to build and evolve the schema of one database file.
///
/// The applied version is stored in `PRAGMA user_version`. A fresh file
/// reports version 0, which triggers [`on_create`](Self::on_create); a file
/// behind [`version`](Self::version) triggers [`on_upgrade`](Self::on_upgrade).
/// Either way the statements and the new version stamp commit together.
pub trait SchemaHelper: Send + Sync {
   /// Schema version this build expects. Must be at least 1.
   fn version(&self) -> i64;

   /// Statements that create the schema in an empty database.
   fn on_create(&self) -> Vec<String>;

   /// Statements that bring a database from `old_version` to `new_version`.
   fn on_upgrade(&self, old_version: i64, new_version: i64) -> Vec<String>;
}

/// What happened when the schema was applied to a database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
   /// Schema was created from scratch
   Created { version: i64 },
   /// Schema was upgraded from an older version
   Upgraded { from: i64, to: i64 },
   /// Schema was already at the expected version
   Current { version: i64 },
}

/// Run the create/upgrade protocol against a write connection
pub(crate) async fn apply_schema(
   conn: &mut SqliteConnection,
   helper: &dyn SchemaHelper,
) -> Result<SchemaOutcome> {
   let requested = helper.version();
   if requested < 1 {
      return Err(Error::InvalidSchemaVersion(requested));
   }

   let (current,): (i64,) = sqlx::query_as("PRAGMA user_version")
      .fetch_one(&mut *conn)
      .await?;

   if current == requested {
      debug!(version = current, "Schema is current");
      return Ok(SchemaOutcome::Current { version: current });
   }

   if current > requested {
      return Err(Error::SchemaDowngrade { current, requested });
   }

   let (statements, outcome) = if current == 0 {
      (
         helper.on_create(),
         SchemaOutcome::Created { version: requested },
      )
   } else {
      (
         helper.on_upgrade(current, requested),
         SchemaOutcome::Upgraded {
            from: current,
            to: requested,
         },
      )
   };

   let mut tx = conn.begin().await?;
   for statement in &statements {
      debug!(sql = %statement, "Applying schema statement");
      sqlx::query(statement).execute(&mut *tx).await?;
   }

   // PRAGMA does not accept bound parameters
   sqlx::query(&format!("PRAGMA user_version = {requested}"))
      .execute(&mut *tx)
      .await?;
   tx.commit().await?;

   info!(?outcome, statements = statements.len(), "Applied database schema");
   Ok(outcome)
}
