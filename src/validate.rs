//! Field checks applied to insert and update payloads before any storage access.

use serde_json::Value as JsonValue;

use crate::contract::{
   self, COLUMN_ID, COLUMN_PET_GENDER, COLUMN_PET_NAME, COLUMN_PET_WEIGHT, is_valid_gender,
};
use crate::values::ContentValues;
use crate::{Error, Result};

/// Which payload rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
   /// Full record: `name` and `gender` must be present.
   Insert,
   /// Partial record: only the keys present are checked.
   Update,
}

/// Checks `values` against the pet invariants.
///
/// Unknown keys fail first, then required keys (insert only), then the value
/// of each known key that is present. `breed` is never checked.
pub fn validate(values: &ContentValues, mode: ValidationMode) -> Result<()> {
   if let Some(unknown) = values.keys().find(|key| contract::column(key).is_none()) {
      return Err(Error::UnknownColumn(unknown.to_string()));
   }

   if values.contains_key(COLUMN_ID) {
      return Err(invalid(COLUMN_ID, "is assigned by the store and cannot be written"));
   }

   if mode == ValidationMode::Insert {
      for required in [COLUMN_PET_NAME, COLUMN_PET_GENDER] {
         if !values.contains_key(required) {
            return Err(invalid(required, "is required"));
         }
      }
   }

   if let Some(name) = values.get(COLUMN_PET_NAME) {
      check_name(name)?;
   }
   if let Some(gender) = values.get(COLUMN_PET_GENDER) {
      check_gender(gender)?;
   }
   if let Some(weight) = values.get(COLUMN_PET_WEIGHT) {
      check_weight(weight)?;
   }

   Ok(())
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
   Error::InvalidField {
      field,
      reason: reason.into(),
   }
}

fn check_name(value: &JsonValue) -> Result<()> {
   match value.as_str() {
      Some(name) if !name.is_empty() => Ok(()),
      Some(_) => Err(invalid(COLUMN_PET_NAME, "pet requires a name")),
      None => Err(invalid(COLUMN_PET_NAME, "must be a string")),
   }
}

fn check_gender(value: &JsonValue) -> Result<()> {
   match value.as_i64() {
      Some(code) if is_valid_gender(code) => Ok(()),
      _ => Err(invalid(COLUMN_PET_GENDER, format!("{value} is not a valid gender"))),
   }
}

fn check_weight(value: &JsonValue) -> Result<()> {
   match value.as_i64() {
      Some(weight) if weight >= 0 => Ok(()),
      Some(_) => Err(invalid(COLUMN_PET_WEIGHT, "pet requires a non-negative weight")),
      None => Err(invalid(COLUMN_PET_WEIGHT, "must be an integer")),
   }
}
