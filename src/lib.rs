//! # shelter-provider
//!
//! Record provider for a small pet shelter catalog. Every read and write of
//! a pet goes through [`PetProvider`], addressed by a content address:
//!
//! - `content://com.example.android.pets/pets` names the whole collection
//! - `content://com.example.android.pets/pets/<id>` names one pet
//!
//! The provider checks payloads against the pet invariants before touching
//! storage, runs a single statement against the database owned by
//! [`shelter_conn_mgr`], and announces successful writes through
//! [`shelter_observer`].
//!
//! ## Usage
//!
//! ```no_run
//! use shelter_provider::{ContentValues, PetProvider, ProviderConfig, contract};
//!
//! #[tokio::main]
//! async fn main() -> shelter_provider::Result<()> {
//!     let provider = PetProvider::open(&ProviderConfig::default()).await?;
//!
//!     let _sub = provider.subscribe(&contract::content_uri(), |change| {
//!         println!("{} via {}", change.operation, change.uri);
//!     })?;
//!
//!     let values = ContentValues::new()
//!         .with(contract::COLUMN_PET_NAME, "Toto")
//!         .with(contract::COLUMN_PET_BREED, "Terrier")
//!         .with(contract::COLUMN_PET_GENDER, contract::Gender::Male.code())
//!         .with(contract::COLUMN_PET_WEIGHT, 7);
//!     provider.insert(&contract::content_uri(), values).await?;
//!
//!     for pet in provider.list_pets().await? {
//!         println!("{pet}");
//!     }
//!
//!     provider.close().await
//! }
//! ```

pub mod address;
mod builders;
pub mod config;
pub mod contract;
mod cursor;
mod decode;
pub mod editor;
mod error;
mod provider;
mod record;
mod schema;
pub mod validate;
mod values;

pub use address::{ContentType, Route};
pub use builders::{DeleteBuilder, QueryBuilder, UpdateBuilder};
pub use config::ProviderConfig;
pub use contract::Gender;
pub use cursor::PetCursor;
pub use editor::{EditorMode, PetForm, SaveOutcome};
pub use error::{Error, Result};
pub use provider::PetProvider;
pub use record::{PetRecord, Row};
pub use schema::{CREATE_PETS_TABLE, PetDbHelper};
pub use values::ContentValues;

pub use shelter_conn_mgr::{SchemaOutcome, SqliteDatabaseConfig};
pub use shelter_observer::{ChangeNotification, ChangeOperation, ChangeStream, Subscription};
