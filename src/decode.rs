use serde_json::Value as JsonValue;
use sqlx::Sqlite;
use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row as _, TypeInfo, Value, ValueRef};

use crate::Error;
use crate::record::Row;

/// Convert a SQLite value to a JSON value.
///
/// The pets table only holds TEXT and INTEGER columns; REAL and boolean
/// values are still mapped so caller-supplied expressions decode. BLOB has
/// no JSON form here and is rejected.
pub fn to_json(value: SqliteValueRef) -> Result<JsonValue, Error> {
   if value.is_null() {
      return Ok(JsonValue::Null);
   }

   let column_type = value.type_info();

   // Handle types based on SQLite's type affinity
   let result = match column_type.name() {
      "TEXT" => JsonValue::String(decode::<String>(&value)?),

      "REAL" => JsonValue::from(decode::<f64>(&value)?),

      "INTEGER" | "NUMERIC" => JsonValue::Number(decode::<i64>(&value)?.into()),

      "BOOLEAN" => JsonValue::Bool(decode::<bool>(&value)?),

      "NULL" => JsonValue::Null,

      "BLOB" => {
         return Err(Error::UnsupportedDatatype(
            "BLOB values cannot be represented in a pet row".to_string(),
         ));
      }

      _ => {
         // For unknown types, try to decode as text
         if let Ok(text) = value.to_owned().try_decode::<String>() {
            JsonValue::String(text)
         } else {
            return Err(Error::UnsupportedDatatype(format!(
               "Unknown SQLite type: {}",
               column_type.name()
            )));
         }
      }
   };

   Ok(result)
}

/// A non-null value that does not decode as its storage class is an error,
/// never a silent null
fn decode<T>(value: &SqliteValueRef) -> Result<T, Error>
where
   T: for<'r> sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
   value.to_owned().try_decode::<T>().map_err(|e| {
      Error::UnsupportedDatatype(format!("cannot decode {} value: {e}", value.type_info().name()))
   })
}

/// Decode SQLite rows to ordered column/value maps
pub fn decode_rows(rows: Vec<SqliteRow>) -> Result<Vec<Row>, Error> {
   let mut values = Vec::with_capacity(rows.len());
   for row in rows {
      let mut value = Row::default();
      for (i, column) in row.columns().iter().enumerate() {
         let v = row.try_get_raw(i)?;
         let v = to_json(v)?;
         value.insert(column.name().to_string(), v);
      }
      values.push(value);
   }
   Ok(values)
}
