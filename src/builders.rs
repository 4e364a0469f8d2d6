//! Awaitable builders for query, update and delete
//!
//! Each builder carries the optional parts of its operation (projection,
//! filter, sort order) and runs when awaited.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use serde_json::Value as JsonValue;
use shelter_observer::ChangeOperation;
use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use tracing::debug;

use crate::address::Route;
use crate::contract::{self, COLUMN_ID, TABLE_NAME};
use crate::cursor::PetCursor;
use crate::decode::decode_rows;
use crate::provider::PetProvider;
use crate::validate::{ValidationMode, validate};
use crate::values::ContentValues;
use crate::{Error, Result};

/// Builder for queries returning a [`PetCursor`]
pub struct QueryBuilder {
   provider: PetProvider,
   address: String,
   columns: Option<Vec<String>>,
   filter: Option<String>,
   filter_args: Vec<JsonValue>,
   sort_order: Option<String>,
}

impl QueryBuilder {
   pub(crate) fn new(provider: PetProvider, address: String) -> Self {
      Self {
         provider,
         address,
         columns: None,
         filter: None,
         filter_args: Vec::new(),
         sort_order: None,
      }
   }

   /// Restrict the result to these columns. Without this every column is returned.
   pub fn columns<I, S>(mut self, columns: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.columns = Some(columns.into_iter().map(Into::into).collect());
      self
   }

   /// SQL `WHERE` clause with `?` placeholders bound to `args`
   ///
   /// Ignored for item addresses, which always select by id.
   pub fn filter(mut self, filter: impl Into<String>, args: Vec<JsonValue>) -> Self {
      self.filter = Some(filter.into());
      self.filter_args = args;
      self
   }

   /// SQL `ORDER BY` clause
   pub fn sort_order(mut self, sort_order: impl Into<String>) -> Self {
      self.sort_order = Some(sort_order.into());
      self
   }

   /// Execute the query and return a cursor over the matching rows
   pub async fn execute(self) -> Result<PetCursor> {
      let route = Route::resolve(&self.address)?;

      let columns = match self.columns {
         Some(columns) if !columns.is_empty() => {
            check_projection(&columns)?;
            columns
         }
         _ => contract::column_names(),
      };

      let (filter, args) = selection(route, self.filter, self.filter_args);

      let mut sql = format!("SELECT {} FROM {TABLE_NAME}", columns.join(", "));
      push_where(&mut sql, filter.as_deref());
      if let Some(order) = self.sort_order.as_deref().filter(|o| !o.trim().is_empty()) {
         sql.push_str(" ORDER BY ");
         sql.push_str(order);
      }

      let pool = self.provider.database().open_for_read().await?;
      let mut q = sqlx::query(&sql);
      for value in args {
         q = bind_value(q, value);
      }
      let rows = decode_rows(q.fetch_all(pool).await?)?;

      debug!(address = %self.address, rows = rows.len(), "Queried pets");

      let uri = route.uri().unwrap_or(self.address);
      Ok(PetCursor::new(columns, rows, uri, self.provider.broker()))
   }
}

impl IntoFuture for QueryBuilder {
   type Output = Result<PetCursor>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Builder for updates returning the number of changed rows
pub struct UpdateBuilder {
   provider: PetProvider,
   address: String,
   values: ContentValues,
   filter: Option<String>,
   filter_args: Vec<JsonValue>,
}

impl UpdateBuilder {
   pub(crate) fn new(provider: PetProvider, address: String, values: ContentValues) -> Self {
      Self {
         provider,
         address,
         values,
         filter: None,
         filter_args: Vec::new(),
      }
   }

   /// SQL `WHERE` clause with `?` placeholders bound to `args`
   ///
   /// Ignored for item addresses, which always select by id.
   pub fn filter(mut self, filter: impl Into<String>, args: Vec<JsonValue>) -> Self {
      self.filter = Some(filter.into());
      self.filter_args = args;
      self
   }

   /// Execute the update
   ///
   /// An empty payload returns 0 without touching the database.
   pub async fn execute(self) -> Result<u64> {
      let route = Route::resolve(&self.address)?;

      if self.values.is_empty() {
         return Ok(0);
      }

      validate(&self.values, ValidationMode::Update)?;

      let (filter, args) = selection(route, self.filter, self.filter_args);

      let assignments = self
         .values
         .keys()
         .map(|column| format!("{column} = ?"))
         .collect::<Vec<_>>()
         .join(", ");
      let mut sql = format!("UPDATE {TABLE_NAME} SET {assignments}");
      push_where(&mut sql, filter.as_deref());

      let mut writer = self.provider.database().open_for_write().await?;
      let mut q = sqlx::query(&sql);
      for (_, value) in self.values {
         q = bind_value(q, value);
      }
      for value in args {
         q = bind_value(q, value);
      }
      let rows_affected = q.execute(&mut *writer).await?.rows_affected();
      drop(writer);

      debug!(address = %self.address, rows_affected, "Updated pets");

      if rows_affected > 0 {
         self
            .provider
            .notify_change(route, ChangeOperation::Update, rows_affected);
      }

      Ok(rows_affected)
   }
}

impl IntoFuture for UpdateBuilder {
   type Output = Result<u64>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Builder for deletes returning the number of removed rows
pub struct DeleteBuilder {
   provider: PetProvider,
   address: String,
   filter: Option<String>,
   filter_args: Vec<JsonValue>,
}

impl DeleteBuilder {
   pub(crate) fn new(provider: PetProvider, address: String) -> Self {
      Self {
         provider,
         address,
         filter: None,
         filter_args: Vec::new(),
      }
   }

   /// SQL `WHERE` clause with `?` placeholders bound to `args`
   ///
   /// Ignored for item addresses, which always select by id.
   pub fn filter(mut self, filter: impl Into<String>, args: Vec<JsonValue>) -> Self {
      self.filter = Some(filter.into());
      self.filter_args = args;
      self
   }

   /// Execute the delete
   pub async fn execute(self) -> Result<u64> {
      let route = Route::resolve(&self.address)?;
      let (filter, args) = selection(route, self.filter, self.filter_args);

      let mut sql = format!("DELETE FROM {TABLE_NAME}");
      push_where(&mut sql, filter.as_deref());

      let mut writer = self.provider.database().open_for_write().await?;
      let mut q = sqlx::query(&sql);
      for value in args {
         q = bind_value(q, value);
      }
      let rows_affected = q.execute(&mut *writer).await?.rows_affected();
      drop(writer);

      debug!(address = %self.address, rows_affected, "Deleted pets");

      if rows_affected > 0 {
         self
            .provider
            .notify_change(route, ChangeOperation::Delete, rows_affected);
      }

      Ok(rows_affected)
   }
}

impl IntoFuture for DeleteBuilder {
   type Output = Result<u64>;
   type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

   fn into_future(self) -> Self::IntoFuture {
      Box::pin(self.execute())
   }
}

/// Item addresses replace any caller filter with `id = ?`
fn selection(
   route: Route,
   filter: Option<String>,
   args: Vec<JsonValue>,
) -> (Option<String>, Vec<JsonValue>) {
   match route {
      Route::Item(id) => (Some(format!("{COLUMN_ID} = ?")), vec![JsonValue::from(id)]),
      _ => (filter.filter(|f| !f.trim().is_empty()), args),
   }
}

fn push_where(sql: &mut String, filter: Option<&str>) {
   if let Some(filter) = filter {
      sql.push_str(" WHERE ");
      sql.push_str(filter);
   }
}

fn check_projection(columns: &[String]) -> Result<()> {
   match columns.iter().find(|name| contract::column(name).is_none()) {
      Some(unknown) => Err(Error::UnknownColumn(unknown.clone())),
      None => Ok(()),
   }
}

/// Helper to bind a JSON value to a query
pub(crate) fn bind_value<'a>(
   query: Query<'a, Sqlite, SqliteArguments<'a>>,
   value: JsonValue,
) -> Query<'a, Sqlite, SqliteArguments<'a>> {
   match value {
      JsonValue::Null => query.bind(None::<JsonValue>),
      JsonValue::String(text) => query.bind(text),
      JsonValue::Bool(flag) => query.bind(flag),
      JsonValue::Number(number) => {
         // Preserve integer precision by binding as i64 when possible
         if let Some(int_val) = number.as_i64() {
            query.bind(int_val)
         } else {
            query.bind(number.as_f64().unwrap_or_default())
         }
      }
      other => query.bind(other),
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn test_item_selection_overrides_filter() {
      let (filter, args) = selection(
         Route::Item(4),
         Some("name = ?".into()),
         vec![json!("Toto")],
      );
      assert_eq!(filter.as_deref(), Some("id = ?"));
      assert_eq!(args, vec![json!(4)]);
   }

   #[test]
   fn test_collection_selection_keeps_filter() {
      let (filter, args) =
         selection(Route::Collection, Some("weight > ?".into()), vec![json!(5)]);
      assert_eq!(filter.as_deref(), Some("weight > ?"));
      assert_eq!(args, vec![json!(5)]);

      let (filter, _) = selection(Route::Collection, Some("  ".into()), Vec::new());
      assert_eq!(filter, None);
   }

   #[test]
   fn test_check_projection() {
      assert!(check_projection(&["id".to_string(), "name".to_string()]).is_ok());
      assert!(matches!(
         check_projection(&["name".to_string(), "owner".to_string()]),
         Err(Error::UnknownColumn(c)) if c == "owner"
      ));
   }

   #[test]
   fn test_push_where() {
      let mut sql = "DELETE FROM pets".to_string();
      push_where(&mut sql, None);
      assert_eq!(sql, "DELETE FROM pets");
      push_where(&mut sql, Some("id = ?"));
      assert_eq!(sql, "DELETE FROM pets WHERE id = ?");
   }
}
