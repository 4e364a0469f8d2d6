//! Add/edit workflow shared by front ends.
//!
//! A front end collects loose field input into a [`PetForm`] and saves it in
//! an explicit [`EditorMode`]: either a new pet, or an existing pet named by
//! its item address.

use tracing::{debug, warn};

use crate::contract::{
   COLUMN_PET_BREED, COLUMN_PET_GENDER, COLUMN_PET_NAME, COLUMN_PET_WEIGHT, Gender, content_uri,
};
use crate::provider::PetProvider;
use crate::values::ContentValues;
use crate::{Result, Route};

/// Whether the editor creates a pet or changes an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
   Add,
   /// Item address of the pet being edited
   Edit(String),
}

impl EditorMode {
   /// Edit mode for item addresses, add mode for anything else.
   pub fn for_address(address: Option<&str>) -> Self {
      match address.map(|a| (a, Route::classify(a))) {
         Some((address, Route::Item(_))) => EditorMode::Edit(address.to_string()),
         _ => EditorMode::Add,
      }
   }
}

/// Raw editor input. `None` means the field was left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
   pub name: Option<String>,
   pub breed: Option<String>,
   pub gender: Option<Gender>,
   pub weight: Option<i64>,
}

/// Result of [`save_pet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
   /// A new pet was stored with this id
   Inserted(i64),
   /// This many pets were updated
   Updated(u64),
   /// The form had no name, so nothing was saved
   Discarded,
   /// The store rejected the insert
   Failed,
}

impl PetForm {
   fn trimmed_name(&self) -> Option<&str> {
      self.name.as_deref().map(str::trim)
   }

   /// Payload for `mode`.
   ///
   /// Add mode always carries a gender (unknown when untouched); edit mode
   /// carries only the fields that were touched. A blank breed is stored as
   /// NULL.
   pub fn to_values(&self, mode: &EditorMode) -> ContentValues {
      let mut values = ContentValues::new();

      if let Some(name) = self.trimmed_name() {
         values.put(COLUMN_PET_NAME, name);
      }
      if let Some(breed) = self.breed.as_deref().map(str::trim) {
         if breed.is_empty() {
            values.put_null(COLUMN_PET_BREED);
         } else {
            values.put(COLUMN_PET_BREED, breed);
         }
      }
      match (self.gender, mode) {
         (Some(gender), _) => {
            values.put(COLUMN_PET_GENDER, gender.code());
         }
         (None, EditorMode::Add) => {
            values.put(COLUMN_PET_GENDER, Gender::Unknown.code());
         }
         (None, EditorMode::Edit(_)) => {}
      }
      if let Some(weight) = self.weight {
         values.put(COLUMN_PET_WEIGHT, weight);
      }

      values
   }
}

/// Saves `form` in `mode`.
///
/// A blank name discards the form instead of failing validation.
pub async fn save_pet(
   provider: &PetProvider,
   mode: &EditorMode,
   form: &PetForm,
) -> Result<SaveOutcome> {
   if form.trimmed_name().is_some_and(str::is_empty)
      || (*mode == EditorMode::Add && form.name.is_none())
   {
      debug!(?mode, "Discarding pet form without a name");
      return Ok(SaveOutcome::Discarded);
   }

   let values = form.to_values(mode);

   match mode {
      EditorMode::Add => match provider.insert(&content_uri(), values).await? {
         Some(id) => Ok(SaveOutcome::Inserted(id)),
         None => {
            warn!("Pet could not be saved");
            Ok(SaveOutcome::Failed)
         }
      },
      EditorMode::Edit(address) => {
         let updated = provider.update(address, values).await?;
         Ok(SaveOutcome::Updated(updated))
      }
   }
}

/// Deletes the pet being edited. Add mode has nothing to delete.
pub async fn delete_pet(provider: &PetProvider, mode: &EditorMode) -> Result<u64> {
   match mode {
      EditorMode::Add => Ok(0),
      EditorMode::Edit(address) => provider.delete(address).await,
   }
}
