//! Classification of pet addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::contract::{CONTENT_ITEM_TYPE, CONTENT_LIST_TYPE, content_uri, item_uri};
use crate::{Error, Result};

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
   Regex::new(r"^(?:content://)?com\.example\.android\.pets/pets(?:/(\d+))?/?$")
      .expect("pet address regex")
});

/// What an address refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
   /// The whole pet collection.
   Collection,
   /// One pet, by id.
   Item(i64),
   /// Anything else.
   Unrecognized,
}

impl Route {
   /// Classifies `address`. Pure; ids that do not fit an `i64` are unrecognized.
   pub fn classify(address: &str) -> Route {
      let Some(caps) = ADDRESS_RE.captures(address.trim()) else {
         return Route::Unrecognized;
      };

      match caps.get(1) {
         None => Route::Collection,
         Some(id) => id
            .as_str()
            .parse::<i64>()
            .map(Route::Item)
            .unwrap_or(Route::Unrecognized),
      }
   }

   /// Like [`classify`](Self::classify), but unrecognized addresses are an error.
   pub fn resolve(address: &str) -> Result<Route> {
      match Route::classify(address) {
         Route::Unrecognized => Err(Error::UnrecognizedAddress(address.to_string())),
         route => Ok(route),
      }
   }

   /// Canonical address of this route, with scheme and without trailing `/`.
   pub fn uri(self) -> Option<String> {
      match self {
         Route::Collection => Some(content_uri()),
         Route::Item(id) => Some(item_uri(id)),
         Route::Unrecognized => None,
      }
   }

   /// Content type of this route.
   pub fn content_type(self) -> Option<ContentType> {
      match self {
         Route::Collection => Some(ContentType::Collection),
         Route::Item(_) => Some(ContentType::Item),
         Route::Unrecognized => None,
      }
   }
}

/// Content type of a recognized address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
   Collection,
   Item,
}

impl ContentType {
   pub fn mime(self) -> &'static str {
      match self {
         ContentType::Collection => CONTENT_LIST_TYPE,
         ContentType::Item => CONTENT_ITEM_TYPE,
      }
   }
}

impl std::fmt::Display for ContentType {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.write_str(self.mime())
   }
}
