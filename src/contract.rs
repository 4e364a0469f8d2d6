//! Names, addresses and value domains shared by the store and its callers.
//!
//! Nothing here touches the database: it is the vocabulary the rest of the
//! crate (and any caller) uses to talk about pets.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Authority segment of every pet address.
pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";

/// Scheme prefix of every pet address.
pub const SCHEME: &str = "content://";

/// Path segment of the pet collection.
pub const PATH_PETS: &str = "pets";

/// Table holding pet rows.
pub const TABLE_NAME: &str = "pets";

/// Default file name of the backing database.
pub const DATABASE_NAME: &str = "shelter.db";

/// Schema version stamped into `PRAGMA user_version`.
pub const DATABASE_VERSION: i64 = 1;

pub const COLUMN_ID: &str = "id";
pub const COLUMN_PET_NAME: &str = "name";
pub const COLUMN_PET_BREED: &str = "breed";
pub const COLUMN_PET_GENDER: &str = "gender";
pub const COLUMN_PET_WEIGHT: &str = "weight";

/// MIME-like type of an address naming the whole collection.
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/com.example.android.pets/pets";

/// MIME-like type of an address naming a single pet.
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/com.example.android.pets/pets";

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
   Integer,
   Text,
}

/// Static description of one column of the pets table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
   pub name: &'static str,
   pub column_type: ColumnType,
   pub nullable: bool,
}

/// Every column of the pets table, in table order.
pub const COLUMNS: [ColumnSpec; 5] = [
   ColumnSpec {
      name: COLUMN_ID,
      column_type: ColumnType::Integer,
      nullable: false,
   },
   ColumnSpec {
      name: COLUMN_PET_NAME,
      column_type: ColumnType::Text,
      nullable: false,
   },
   ColumnSpec {
      name: COLUMN_PET_BREED,
      column_type: ColumnType::Text,
      nullable: true,
   },
   ColumnSpec {
      name: COLUMN_PET_GENDER,
      column_type: ColumnType::Integer,
      nullable: false,
   },
   ColumnSpec {
      name: COLUMN_PET_WEIGHT,
      column_type: ColumnType::Integer,
      nullable: false,
   },
];

/// Looks up a column by name.
pub fn column(name: &str) -> Option<&'static ColumnSpec> {
   COLUMNS.iter().find(|spec| spec.name == name)
}

/// Names of every column, in table order.
pub fn column_names() -> Vec<String> {
   COLUMNS.iter().map(|spec| spec.name.to_string()).collect()
}

/// Gender of a pet, stored as its integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
#[repr(i64)]
pub enum Gender {
   #[default]
   Unknown = 0,
   Male = 1,
   Female = 2,
}

impl Gender {
   pub fn code(self) -> i64 {
      self as i64
   }

   pub fn as_str(self) -> &'static str {
      match self {
         Gender::Unknown => "unknown",
         Gender::Male => "male",
         Gender::Female => "female",
      }
   }
}

impl TryFrom<i64> for Gender {
   type Error = Error;

   fn try_from(value: i64) -> Result<Self, Self::Error> {
      match value {
         0 => Ok(Gender::Unknown),
         1 => Ok(Gender::Male),
         2 => Ok(Gender::Female),
         other => Err(Error::InvalidField {
            field: COLUMN_PET_GENDER,
            reason: format!("{other} is not one of 0 (unknown), 1 (male), 2 (female)"),
         }),
      }
   }
}

impl From<Gender> for i64 {
   fn from(gender: Gender) -> Self {
      gender.code()
   }
}

impl std::fmt::Display for Gender {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.write_str(self.as_str())
   }
}

impl std::str::FromStr for Gender {
   type Err = Error;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.trim().to_ascii_lowercase().as_str() {
         "unknown" | "0" => Ok(Gender::Unknown),
         "male" | "m" | "1" => Ok(Gender::Male),
         "female" | "f" | "2" => Ok(Gender::Female),
         _ => Err(Error::InvalidField {
            field: COLUMN_PET_GENDER,
            reason: format!("'{s}' is not a gender (expected unknown, male or female)"),
         }),
      }
   }
}

/// Returns true iff `value` is a known gender code.
pub fn is_valid_gender(value: i64) -> bool {
   Gender::try_from(value).is_ok()
}

/// Address of the whole pet collection.
pub fn content_uri() -> String {
   format!("{SCHEME}{CONTENT_AUTHORITY}/{PATH_PETS}")
}

/// Address of the pet with `id`.
pub fn item_uri(id: i64) -> String {
   format!("{}/{id}", content_uri())
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_gender_codes() {
      assert!(is_valid_gender(0));
      assert!(is_valid_gender(1));
      assert!(is_valid_gender(2));
      assert!(!is_valid_gender(3));
      assert!(!is_valid_gender(-1));
      assert_eq!(i64::from(Gender::Female), 2);
   }

   #[test]
   fn test_gender_from_str() {
      assert_eq!("Male".parse::<Gender>().unwrap(), Gender::Male);
      assert_eq!("f".parse::<Gender>().unwrap(), Gender::Female);
      assert_eq!("0".parse::<Gender>().unwrap(), Gender::Unknown);
      assert!("cat".parse::<Gender>().is_err());
   }

   #[test]
   fn test_gender_serde_uses_code() {
      assert_eq!(serde_json::to_value(Gender::Male).unwrap(), serde_json::json!(1));
      assert_eq!(
         serde_json::from_value::<Gender>(serde_json::json!(2)).unwrap(),
         Gender::Female
      );
      assert!(serde_json::from_value::<Gender>(serde_json::json!(7)).is_err());
   }

   #[test]
   fn test_addresses() {
      assert_eq!(content_uri(), "content://com.example.android.pets/pets");
      assert_eq!(item_uri(42), "content://com.example.android.pets/pets/42");
   }

   #[test]
   fn test_column_lookup() {
      assert_eq!(column("breed").map(|c| c.nullable), Some(true));
      assert!(column("owner").is_none());
      assert_eq!(column_names(), ["id", "name", "breed", "gender", "weight"]);
   }
}
