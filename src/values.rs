use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Column name to value map carried by insert and update.
///
/// Keys keep insertion order, which is also the order columns appear in the
/// generated statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentValues(IndexMap<String, JsonValue>);

impl ContentValues {
   pub fn new() -> Self {
      Self::default()
   }

   /// Sets `key` to `value`, replacing any earlier value.
   pub fn put(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> &mut Self {
      self.0.insert(key.into(), value.into());
      self
   }

   /// Sets `key` to SQL NULL.
   pub fn put_null(&mut self, key: impl Into<String>) -> &mut Self {
      self.0.insert(key.into(), JsonValue::Null);
      self
   }

   /// Builder-style [`put`](Self::put).
   pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
      self.put(key, value);
      self
   }

   pub fn get(&self, key: &str) -> Option<&JsonValue> {
      self.0.get(key)
   }

   pub fn contains_key(&self, key: &str) -> bool {
      self.0.contains_key(key)
   }

   pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
      self.0.shift_remove(key)
   }

   pub fn keys(&self) -> impl Iterator<Item = &str> {
      self.0.keys().map(String::as_str)
   }

   pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
      self.0.iter().map(|(k, v)| (k.as_str(), v))
   }

   pub fn len(&self) -> usize {
      self.0.len()
   }

   pub fn is_empty(&self) -> bool {
      self.0.is_empty()
   }
}

impl From<IndexMap<String, JsonValue>> for ContentValues {
   fn from(map: IndexMap<String, JsonValue>) -> Self {
      Self(map)
   }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for ContentValues {
   fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
      Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
   }
}

impl IntoIterator for ContentValues {
   type Item = (String, JsonValue);
   type IntoIter = indexmap::map::IntoIter<String, JsonValue>;

   fn into_iter(self) -> Self::IntoIter {
      self.0.into_iter()
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use serde_json::json;

   #[test]
   fn test_put_keeps_insertion_order() {
      let mut values = ContentValues::new();
      values.put("weight", 4).put("name", "Rex").put_null("breed");
      values.put("weight", 5);

      assert_eq!(values.keys().collect::<Vec<_>>(), ["weight", "name", "breed"]);
      assert_eq!(values.get("weight"), Some(&json!(5)));
      assert_eq!(values.get("breed"), Some(&JsonValue::Null));
   }

   #[test]
   fn test_deserialize_from_json_object() {
      let values: ContentValues =
         serde_json::from_value(json!({"name": "Toto", "gender": 1})).unwrap();
      assert_eq!(values.len(), 2);
      assert!(values.contains_key("gender"));
   }

   #[test]
   fn test_remove() {
      let mut values = ContentValues::new().with("name", "Toto").with("gender", 1);
      assert_eq!(values.remove("name"), Some(json!("Toto")));
      assert_eq!(values.keys().collect::<Vec<_>>(), ["gender"]);
      assert!(!ContentValues::new().with("x", 1).is_empty());
   }
}
