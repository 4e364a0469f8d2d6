//! The pet record provider: routing, validation, storage and notification.

use std::sync::Arc;

use shelter_conn_mgr::SqliteDatabase;
use shelter_observer::{
   ChangeBroker, ChangeNotification, ChangeOperation, ChangeStream, ObserverConfig, Subscription,
};
use tracing::{debug, error};

use crate::address::{ContentType, Route};
use crate::builders::{DeleteBuilder, QueryBuilder, UpdateBuilder, bind_value};
use crate::config::ProviderConfig;
use crate::contract::{COLUMN_ID, TABLE_NAME, content_uri, item_uri};
use crate::record::PetRecord;
use crate::schema::PetDbHelper;
use crate::validate::{ValidationMode, validate};
use crate::values::ContentValues;
use crate::{Error, Result};

/// Access point for every read and write of pet records.
///
/// Cloning is cheap and clones share the database handle and the observer
/// registry, so a write through one clone notifies observers registered
/// through another.
///
/// # Example
///
/// ```no_run
/// use shelter_provider::{ContentValues, PetProvider, ProviderConfig, contract};
///
/// # async fn example() -> shelter_provider::Result<()> {
/// let provider = PetProvider::open(&ProviderConfig::default()).await?;
///
/// let values = ContentValues::new()
///    .with(contract::COLUMN_PET_NAME, "Toto")
///    .with(contract::COLUMN_PET_GENDER, 1);
/// let id = provider.insert(&contract::content_uri(), values).await?;
///
/// if let Some(id) = id {
///    let cursor = provider.query(&contract::item_uri(id)).await?;
///    assert_eq!(cursor.len(), 1);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PetProvider {
   db: Arc<SqliteDatabase>,
   broker: Arc<ChangeBroker>,
}

impl PetProvider {
   /// Connects to the database named by `config`, creating the file if needed.
   ///
   /// The table itself is created on the first read or write.
   pub async fn open(config: &ProviderConfig) -> Result<Self> {
      let db = SqliteDatabase::connect_with_schema(
         &config.database_path,
         Some(config.database.clone()),
         Arc::new(PetDbHelper),
      )
      .await?;

      let broker = ChangeBroker::new(
         &ObserverConfig::new().with_channel_capacity(config.channel_capacity),
      );

      debug!(path = %db.path().display(), "Opened pet provider");
      Ok(Self { db, broker })
   }

   /// Query pets at `address`
   ///
   /// Await the returned builder, optionally after narrowing it with
   /// `columns`, `filter` and `sort_order`.
   pub fn query(&self, address: &str) -> QueryBuilder {
      QueryBuilder::new(self.clone(), address.to_string())
   }

   /// Insert one pet through the collection address
   ///
   /// Returns the new id. A failure inside the store after validation has
   /// passed is logged and reported as `Ok(None)`; nothing is notified.
   pub async fn insert(&self, address: &str, values: ContentValues) -> Result<Option<i64>> {
      match Route::resolve(address)? {
         Route::Collection => {}
         _ => {
            return Err(Error::UnsupportedOperation {
               operation: "insert",
               address: address.to_string(),
            });
         }
      }

      validate(&values, ValidationMode::Insert)?;

      let columns = values.keys().collect::<Vec<_>>().join(", ");
      let placeholders = vec!["?"; values.len()].join(", ");
      let sql = format!("INSERT INTO {TABLE_NAME} ({columns}) VALUES ({placeholders})");

      let mut writer = self.db.open_for_write().await?;
      let mut q = sqlx::query(&sql);
      for (_, value) in values {
         q = bind_value(q, value);
      }

      let id = match q.execute(&mut *writer).await {
         Ok(result) => result.last_insert_rowid(),
         Err(e) => {
            error!(error = %e, address, "Failed to insert row");
            return Ok(None);
         }
      };
      drop(writer);

      debug!(id, "Inserted pet");
      self.notify_change(Route::Collection, ChangeOperation::Insert, 1);

      Ok(Some(id))
   }

   /// Update pets at `address` with `values`
   pub fn update(&self, address: &str, values: ContentValues) -> UpdateBuilder {
      UpdateBuilder::new(self.clone(), address.to_string(), values)
   }

   /// Delete pets at `address`
   pub fn delete(&self, address: &str) -> DeleteBuilder {
      DeleteBuilder::new(self.clone(), address.to_string())
   }

   /// Content type of `address`
   pub fn get_type(&self, address: &str) -> Result<ContentType> {
      Route::resolve(address)?
         .content_type()
         .ok_or_else(|| Error::UnrecognizedAddress(address.to_string()))
   }

   /// Fetch one pet by id
   pub async fn get_pet(&self, id: i64) -> Result<Option<PetRecord>> {
      let mut cursor = self.query(&item_uri(id)).await?;
      cursor.next().map(|row| PetRecord::from_row(&row)).transpose()
   }

   /// Every pet, ordered by id
   pub async fn list_pets(&self) -> Result<Vec<PetRecord>> {
      self
         .query(&content_uri())
         .sort_order(format!("{COLUMN_ID} ASC"))
         .await?
         .into_records()
   }

   /// Call `callback` after every write through `address`
   ///
   /// Also fires for writes through the collection when `address` names one
   /// pet. The observer stays registered until the subscription is dropped.
   pub fn subscribe<F>(&self, address: &str, callback: F) -> Result<Subscription>
   where
      F: Fn(&ChangeNotification) + Send + Sync + 'static,
   {
      self.register_observer(address, false, callback)
   }

   /// Like [`subscribe`](Self::subscribe), optionally including writes to
   /// addresses beneath `address`
   pub fn register_observer<F>(
      &self,
      address: &str,
      notify_for_descendants: bool,
      callback: F,
   ) -> Result<Subscription>
   where
      F: Fn(&ChangeNotification) + Send + Sync + 'static,
   {
      let uri = canonical_uri(address)?;
      Ok(self.broker.register(uri, notify_for_descendants, callback))
   }

   /// Stream of notifications relevant to `address`, descendants included
   pub fn changes(&self, address: &str) -> Result<ChangeStream> {
      let uri = canonical_uri(address)?;
      Ok(self.broker.subscribe_stream(uri))
   }

   pub fn database(&self) -> &Arc<SqliteDatabase> {
      &self.db
   }

   pub fn broker(&self) -> &Arc<ChangeBroker> {
      &self.broker
   }

   /// Close the underlying database
   ///
   /// Clones of this provider fail with `StorageUnavailable` afterwards.
   pub async fn close(self) -> Result<()> {
      Ok(self.db.close().await?)
   }

   /// Close the underlying database and delete its files
   pub async fn remove(self) -> Result<()> {
      Ok(self.db.remove().await?)
   }

   pub(crate) fn notify_change(&self, route: Route, operation: ChangeOperation, rows: u64) {
      if let Some(uri) = route.uri() {
         self
            .broker
            .notify_change(ChangeNotification::new(uri, operation, rows));
      }
   }
}

fn canonical_uri(address: &str) -> Result<String> {
   Route::resolve(address)?
      .uri()
      .ok_or_else(|| Error::UnrecognizedAddress(address.to_string()))
}
