use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::Result;
use crate::contract::{
   COLUMN_PET_BREED, COLUMN_PET_GENDER, COLUMN_PET_NAME, COLUMN_PET_WEIGHT, Gender,
};
use crate::values::ContentValues;

/// One decoded result row, columns in projection order.
pub type Row = IndexMap<String, JsonValue>;

/// Typed view of a full pet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
   pub id: i64,
   pub name: String,
   pub breed: Option<String>,
   pub gender: Gender,
   pub weight: i64,
}

impl PetRecord {
   /// Converts a row that carries every pet column.
   pub fn from_row(row: &Row) -> Result<Self> {
      let object: serde_json::Map<String, JsonValue> = row.clone().into_iter().collect();
      Ok(serde_json::from_value(JsonValue::Object(object))?)
   }

   /// Payload that writes every field except `id`.
   pub fn to_values(&self) -> ContentValues {
      let mut values = ContentValues::new();
      values
         .put(COLUMN_PET_NAME, self.name.as_str())
         .put(COLUMN_PET_BREED, self.breed.clone())
         .put(COLUMN_PET_GENDER, self.gender.code())
         .put(COLUMN_PET_WEIGHT, self.weight);
      values
   }
}

impl std::fmt::Display for PetRecord {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write!(
         f,
         "#{} {} ({}, {}, {} kg)",
         self.id,
         self.name,
         self.breed.as_deref().filter(|b| !b.is_empty()).unwrap_or("unknown breed"),
         self.gender,
         self.weight
      )
   }
}
