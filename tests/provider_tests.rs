//! Integration tests for the pet provider.
//!
//! Tests verify:
//! - Validation: name, gender and weight rules on insert and update
//! - Routing: collection vs item addresses, unrecognized addresses
//! - Notifications: fired once per effective write, never for no-ops
//! - Cursors: empty results, projections, change tracking

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use serde_json::{Value as JsonValue, json};
use shelter_provider::contract::{content_uri, item_uri};
use shelter_provider::{
   ChangeNotification, ChangeOperation, ContentType, ContentValues, Error, Gender, PetProvider,
   PetRecord, ProviderConfig, Subscription,
};
use tempfile::TempDir;
use tokio::time::timeout;

async fn create_test_provider() -> (PetProvider, TempDir) {
   let temp_dir = TempDir::new().expect("Failed to create temp directory");
   let config = ProviderConfig::default().with_database_path(temp_dir.path().join("shelter.db"));
   let provider = PetProvider::open(&config)
      .await
      .expect("Failed to open test provider");

   (provider, temp_dir)
}

fn toto() -> ContentValues {
   ContentValues::new()
      .with("name", "Toto")
      .with("breed", "Terrier")
      .with("gender", Gender::Male.code())
      .with("weight", 7)
}

/// Records the address of every notification delivered to an observer.
fn watch(
   provider: &PetProvider,
   address: &str,
   descendants: bool,
) -> (Arc<Mutex<Vec<ChangeNotification>>>, Subscription) {
   let seen = Arc::new(Mutex::new(Vec::new()));
   let sink = Arc::clone(&seen);
   let sub = provider
      .register_observer(address, descendants, move |change| {
         sink.lock().unwrap().push(change.clone());
      })
      .unwrap();
   (seen, sub)
}

async fn count_rows(provider: &PetProvider) -> usize {
   provider.query(&content_uri()).await.unwrap().len()
}

// ============================================================================
// Insert
// ============================================================================

#[tokio::test]
async fn test_insert_then_query_item() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), false);

   let id = provider
      .insert(&content_uri(), toto())
      .await
      .unwrap()
      .expect("insert should return an id");

   let rows: Vec<_> = provider.query(&item_uri(id)).await.unwrap().collect();
   assert_eq!(rows.len(), 1);
   assert_eq!(rows[0]["id"], json!(id));
   assert_eq!(rows[0]["name"], json!("Toto"));
   assert_eq!(rows[0]["breed"], json!("Terrier"));
   assert_eq!(rows[0]["gender"], json!(1));
   assert_eq!(rows[0]["weight"], json!(7));

   let seen = seen.lock().unwrap();
   assert_eq!(seen.len(), 1);
   assert_eq!(seen[0].uri, content_uri());
   assert_eq!(seen[0].operation, ChangeOperation::Insert);

   drop(seen);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_insert_defaults_round_trip() {
   let (provider, _temp) = create_test_provider().await;

   let values = ContentValues::new().with("name", "Binx").with("gender", 2);
   let id = provider.insert(&content_uri(), values).await.unwrap().unwrap();

   let pet = provider.get_pet(id).await.unwrap().unwrap();
   assert_eq!(
      pet,
      PetRecord {
         id,
         name: "Binx".into(),
         breed: None,
         gender: Gender::Female,
         weight: 0,
      }
   );

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_insert_empty_name_rejected() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), true);

   let err = provider
      .insert(&content_uri(), toto().with("name", ""))
      .await
      .unwrap_err();

   assert_eq!(err.invalid_field(), Some("name"));
   assert_eq!(count_rows(&provider).await, 0);
   assert!(seen.lock().unwrap().is_empty());

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_insert_missing_required_fields() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider
      .insert(&content_uri(), ContentValues::new().with("gender", 1))
      .await
      .unwrap_err();
   assert_eq!(err.invalid_field(), Some("name"));

   let err = provider
      .insert(&content_uri(), ContentValues::new().with("name", "Rex"))
      .await
      .unwrap_err();
   assert_eq!(err.invalid_field(), Some("gender"));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_gender_domain_on_insert() {
   let (provider, _temp) = create_test_provider().await;

   for code in [0, 1, 2] {
      let id = provider
         .insert(&content_uri(), toto().with("gender", code))
         .await
         .unwrap();
      assert!(id.is_some(), "gender {code} should be accepted");
   }

   for code in [3, -1, 99] {
      let err = provider
         .insert(&content_uri(), toto().with("gender", code))
         .await
         .unwrap_err();
      assert_eq!(err.invalid_field(), Some("gender"));
   }

   assert_eq!(count_rows(&provider).await, 3);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_negative_weight_rejected() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider
      .insert(&content_uri(), toto().with("weight", -1))
      .await
      .unwrap_err();
   assert_eq!(err.invalid_field(), Some("weight"));
   assert_eq!(err.error_code(), "INVALID_FIELD");

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_insert_on_item_address_unsupported() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider.insert(&item_uri(1), toto()).await.unwrap_err();
   assert!(matches!(
      err,
      Error::UnsupportedOperation { operation: "insert", .. }
   ));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_insert_unknown_column_rejected() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider
      .insert(&content_uri(), toto().with("owner", "Dorothy"))
      .await
      .unwrap_err();
   assert_eq!(err.error_code(), "UNKNOWN_COLUMN");
   assert_eq!(count_rows(&provider).await, 0);

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_ids_are_never_reused() {
   let (provider, _temp) = create_test_provider().await;

   let first = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   assert_eq!(provider.delete(&item_uri(first)).await.unwrap(), 1);
   let second = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();

   assert!(second > first);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_store_failure_on_insert_returns_none() {
   let (provider, _temp) = create_test_provider().await;

   let mut writer = provider.database().open_for_write().await.unwrap();
   sqlx::query("CREATE UNIQUE INDEX pets_unique_name ON pets(name)")
      .execute(&mut *writer)
      .await
      .unwrap();
   drop(writer);

   let (seen, _sub) = watch(&provider, &content_uri(), false);

   let first = provider.insert(&content_uri(), toto()).await.unwrap();
   assert!(first.is_some());

   // Passes validation but violates the index inside the store
   let second = provider.insert(&content_uri(), toto()).await.unwrap();
   assert_eq!(second, None);

   assert_eq!(seen.lock().unwrap().len(), 1, "failed insert must not notify");
   assert_eq!(count_rows(&provider).await, 1);

   provider.remove().await.unwrap();
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_empty_values_is_noop() {
   let (provider, _temp) = create_test_provider().await;
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   let (seen, _sub) = watch(&provider, &content_uri(), true);

   let updated = provider
      .update(&item_uri(id), ContentValues::new())
      .await
      .unwrap();
   assert_eq!(updated, 0);

   let updated = provider
      .update(&content_uri(), ContentValues::new())
      .await
      .unwrap();
   assert_eq!(updated, 0);

   assert!(seen.lock().unwrap().is_empty());
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_update_empty_values_skips_storage() {
   let (provider, _temp) = create_test_provider().await;
   let handle = provider.clone();
   provider.close().await.unwrap();

   // A closed database would fail any real storage access
   let updated = handle
      .update(&content_uri(), ContentValues::new())
      .await
      .unwrap();
   assert_eq!(updated, 0);

   let err = handle
      .update(&content_uri(), ContentValues::new().with("weight", 3))
      .await
      .unwrap_err();
   assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
}

#[tokio::test]
async fn test_update_item_overrides_filter() {
   let (provider, _temp) = create_test_provider().await;
   let first = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   let second = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   let (seen, _sub) = watch(&provider, &item_uri(second), false);

   let updated = provider
      .update(&item_uri(second), ContentValues::new().with("weight", 12))
      .filter("name = ?", vec![json!("Toto")])
      .await
      .unwrap();
   assert_eq!(updated, 1);

   assert_eq!(provider.get_pet(first).await.unwrap().unwrap().weight, 7);
   assert_eq!(provider.get_pet(second).await.unwrap().unwrap().weight, 12);

   let seen = seen.lock().unwrap();
   assert_eq!(seen.len(), 1);
   assert_eq!(seen[0].uri, item_uri(second));
   assert_eq!(seen[0].rows_affected, 1);

   drop(seen);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_update_collection_with_filter() {
   let (provider, _temp) = create_test_provider().await;
   provider.insert(&content_uri(), toto()).await.unwrap();
   provider
      .insert(&content_uri(), toto().with("name", "Rex").with("weight", 30))
      .await
      .unwrap();
   provider
      .insert(&content_uri(), toto().with("name", "Fido").with("weight", 25))
      .await
      .unwrap();

   let updated = provider
      .update(&content_uri(), ContentValues::new().with("breed", JsonValue::Null))
      .filter("weight > ?", vec![json!(20)])
      .await
      .unwrap();
   assert_eq!(updated, 2);

   let pets = provider.list_pets().await.unwrap();
   let breeds: Vec<_> = pets.iter().map(|p| p.breed.as_deref()).collect();
   assert_eq!(breeds, [Some("Terrier"), None, None]);

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_update_validates_present_fields() {
   let (provider, _temp) = create_test_provider().await;
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();

   for (field, value) in [
      ("name", json!("")),
      ("gender", json!(5)),
      ("weight", json!(-3)),
      ("id", json!(100)),
   ] {
      let err = provider
         .update(&item_uri(id), ContentValues::new().with(field, value))
         .await
         .unwrap_err();
      assert_eq!(err.invalid_field(), Some(field));
   }

   for code in [0, 1, 2] {
      let updated = provider
         .update(&item_uri(id), ContentValues::new().with("gender", code))
         .await
         .unwrap();
      assert_eq!(updated, 1);
   }

   let pet = provider.get_pet(id).await.unwrap().unwrap();
   assert_eq!(pet.gender, Gender::Female);
   assert_eq!(pet.name, "Toto");

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_update_missing_item_does_not_notify() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), true);

   let updated = provider
      .update(&item_uri(42), ContentValues::new().with("weight", 1))
      .await
      .unwrap();

   assert_eq!(updated, 0);
   assert!(seen.lock().unwrap().is_empty());
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_update_with_record_values() {
   let (provider, _temp) = create_test_provider().await;
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();

   let mut pet = provider.get_pet(id).await.unwrap().unwrap();
   pet.name = "Toto II".into();
   pet.breed = None;
   assert_eq!(
      provider.update(&item_uri(id), pet.to_values()).await.unwrap(),
      1
   );

   assert_eq!(provider.get_pet(id).await.unwrap(), Some(pet));
   provider.remove().await.unwrap();
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_missing_item() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), true);

   assert_eq!(provider.delete(&item_uri(5)).await.unwrap(), 0);
   assert!(seen.lock().unwrap().is_empty());

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_delete_item_and_collection() {
   let (provider, _temp) = create_test_provider().await;
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   for name in ["Rex", "Fido"] {
      provider
         .insert(&content_uri(), toto().with("name", name))
         .await
         .unwrap();
   }

   let (item_seen, _a) = watch(&provider, &item_uri(id), false);
   let (all_seen, _b) = watch(&provider, &content_uri(), false);

   assert_eq!(provider.delete(&item_uri(id)).await.unwrap(), 1);
   assert_eq!(item_seen.lock().unwrap().len(), 1);
   // item deletes only reach collection observers that asked for descendants
   assert!(all_seen.lock().unwrap().is_empty());

   let deleted = provider
      .delete(&content_uri())
      .filter("name = ?", vec![json!("Rex")])
      .await
      .unwrap();
   assert_eq!(deleted, 1);

   assert_eq!(provider.delete(&content_uri()).await.unwrap(), 1);
   assert_eq!(count_rows(&provider).await, 0);

   let all_seen = all_seen.lock().unwrap();
   assert_eq!(all_seen.len(), 2);
   assert!(all_seen.iter().all(|c| c.operation == ChangeOperation::Delete));
   // collection deletes also reach the item observer
   assert_eq!(item_seen.lock().unwrap().len(), 3);

   drop(all_seen);
   provider.remove().await.unwrap();
}

// ============================================================================
// Query
// ============================================================================

#[tokio::test]
async fn test_query_missing_item_is_empty() {
   let (provider, _temp) = create_test_provider().await;

   let mut cursor = provider.query(&item_uri(5)).await.unwrap();
   assert_eq!(cursor.len(), 0);
   assert!(cursor.next().is_none());
   assert_eq!(cursor.columns(), ["id", "name", "breed", "gender", "weight"]);

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_query_projection_and_sort() {
   let (provider, _temp) = create_test_provider().await;
   for (name, weight) in [("Toto", 7), ("Rex", 30), ("Binx", 4)] {
      provider
         .insert(&content_uri(), toto().with("name", name).with("weight", weight))
         .await
         .unwrap();
   }

   let cursor = provider
      .query(&content_uri())
      .columns(["name", "weight"])
      .filter("weight < ?", vec![json!(10)])
      .sort_order("weight DESC")
      .await
      .unwrap();

   assert_eq!(cursor.columns(), ["name", "weight"]);
   let rows: Vec<_> = cursor.collect();
   assert_eq!(rows.len(), 2);
   assert_eq!(rows[0].keys().collect::<Vec<_>>(), ["name", "weight"]);
   assert_eq!(rows[0]["name"], json!("Toto"));
   assert_eq!(rows[1]["name"], json!("Binx"));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_query_unknown_projection_column() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider
      .query(&content_uri())
      .columns(["name", "owner"])
      .await
      .unwrap_err();
   assert!(matches!(err, Error::UnknownColumn(c) if c == "owner"));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_query_bad_filter_is_sqlite_error() {
   let (provider, _temp) = create_test_provider().await;

   let err = provider
      .query(&content_uri())
      .filter("no_such_column = ?", vec![json!(1)])
      .await
      .unwrap_err();
   assert!(err.error_code().starts_with("SQLITE_"));

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_partial_projection_cannot_become_records() {
   let (provider, _temp) = create_test_provider().await;
   provider.insert(&content_uri(), toto()).await.unwrap();

   let cursor = provider
      .query(&content_uri())
      .columns(["name"])
      .await
      .unwrap();
   let err = cursor.into_records().unwrap_err();
   assert_eq!(err.error_code(), "DECODE_ERROR");

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_cursor_has_changed() {
   let (provider, _temp) = create_test_provider().await;
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();

   let collection = provider.query(&content_uri()).await.unwrap();
   let item = provider.query(&item_uri(id)).await.unwrap();
   let other = provider.query(&item_uri(id + 1)).await.unwrap();
   assert_eq!(collection.notification_uri(), content_uri());
   assert!(!collection.has_changed());

   provider
      .update(&item_uri(id), ContentValues::new().with("weight", 8))
      .await
      .unwrap();

   assert!(collection.has_changed());
   assert!(item.has_changed());
   assert!(!other.has_changed());

   provider.remove().await.unwrap();
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
async fn test_unrecognized_address_for_every_operation() {
   let (provider, _temp) = create_test_provider().await;
   let address = "content://com.example.android.pets/other-path";

   let errors = [
      provider.query(address).await.unwrap_err(),
      provider.insert(address, toto()).await.unwrap_err(),
      provider.update(address, toto()).await.unwrap_err(),
      provider
         .update(address, ContentValues::new())
         .await
         .unwrap_err(),
      provider.delete(address).await.unwrap_err(),
      provider.get_type(address).unwrap_err(),
      provider.subscribe(address, |_| {}).unwrap_err(),
      provider.changes(address).map(|_| ()).unwrap_err(),
   ];

   for err in errors {
      assert!(matches!(&err, Error::UnrecognizedAddress(a) if a == address));
   }
   assert_eq!(count_rows(&provider).await, 0);

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_get_type() {
   let (provider, _temp) = create_test_provider().await;

   assert_eq!(provider.get_type(&content_uri()).unwrap(), ContentType::Collection);
   assert_eq!(provider.get_type(&item_uri(3)).unwrap(), ContentType::Item);
   assert_eq!(
      provider.get_type(&item_uri(3)).unwrap().mime(),
      "vnd.android.cursor.item/com.example.android.pets/pets"
   );

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_address_without_scheme() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), false);

   let id = provider
      .insert("com.example.android.pets/pets", toto())
      .await
      .unwrap()
      .unwrap();
   assert_eq!(
      provider
         .query(&format!("com.example.android.pets/pets/{id}/"))
         .await
         .unwrap()
         .len(),
      1
   );

   // notifications use the canonical address
   assert_eq!(seen.lock().unwrap()[0].uri, content_uri());
   provider.remove().await.unwrap();
}

// ============================================================================
// Notifications
// ============================================================================

#[tokio::test]
async fn test_dropped_subscription_stops_callbacks() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, sub) = watch(&provider, &content_uri(), false);

   provider.insert(&content_uri(), toto()).await.unwrap();
   drop(sub);
   provider.insert(&content_uri(), toto()).await.unwrap();

   assert_eq!(seen.lock().unwrap().len(), 1);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_clones_share_observers() {
   let (provider, _temp) = create_test_provider().await;
   let (seen, _sub) = watch(&provider, &content_uri(), false);

   let clone = provider.clone();
   clone.insert(&content_uri(), toto()).await.unwrap();

   assert_eq!(seen.lock().unwrap().len(), 1);
   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_change_stream() {
   let (provider, _temp) = create_test_provider().await;
   let mut stream = provider.changes(&content_uri()).unwrap();

   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   provider.delete(&item_uri(id)).await.unwrap();

   let first = timeout(Duration::from_millis(100), stream.next())
      .await
      .expect("should receive insert")
      .unwrap();
   assert_eq!(first.operation, ChangeOperation::Insert);

   let second = timeout(Duration::from_millis(100), stream.next())
      .await
      .expect("should receive delete")
      .unwrap();
   assert_eq!(second.operation, ChangeOperation::Delete);
   assert_eq!(second.uri, item_uri(id));

   provider.remove().await.unwrap();
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_data_survives_reopen() {
   let temp = TempDir::new().unwrap();
   let config = ProviderConfig::default().with_database_path(temp.path().join("shelter.db"));

   let provider = PetProvider::open(&config).await.unwrap();
   let id = provider.insert(&content_uri(), toto()).await.unwrap().unwrap();
   provider.close().await.unwrap();

   let provider = PetProvider::open(&config).await.unwrap();
   assert_eq!(
      provider.database().ensure_schema().await.unwrap(),
      Some(shelter_provider::SchemaOutcome::Current { version: 1 })
   );
   assert_eq!(provider.get_pet(id).await.unwrap().unwrap().name, "Toto");

   provider.remove().await.unwrap();
}

#[tokio::test]
async fn test_operations_after_close() {
   let (provider, _temp) = create_test_provider().await;
   let handle = provider.clone();
   provider.close().await.unwrap();

   let err = handle.query(&content_uri()).await.unwrap_err();
   assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");

   let err = handle.insert(&content_uri(), toto()).await.unwrap_err();
   assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");

   // validation still runs first
   let err = handle
      .insert(&content_uri(), toto().with("weight", -1))
      .await
      .unwrap_err();
   assert_eq!(err.error_code(), "INVALID_FIELD");
}

#[tokio::test]
async fn test_memory_path_is_storage_unavailable() {
   let config = ProviderConfig::default().with_database_path(":memory:");

   let err = PetProvider::open(&config).await.unwrap_err();
   assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
   assert!(matches!(
      err,
      Error::StorageUnavailable(shelter_conn_mgr::Error::MemoryDatabase(_))
   ));
}

#[tokio::test]
async fn test_unopenable_path_is_storage_unavailable() {
   let temp = TempDir::new().unwrap();
   let config = ProviderConfig::default()
      .with_database_path(temp.path().join("missing-dir").join("shelter.db"));

   let err = PetProvider::open(&config).await.unwrap_err();
   assert_eq!(err.error_code(), "STORAGE_UNAVAILABLE");
}
