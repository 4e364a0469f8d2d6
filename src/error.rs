/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the pet provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// Address does not name the pet collection or a single pet.
   #[error("unknown address: {0}")]
   UnrecognizedAddress(String),

   /// Operation is not defined for this kind of address.
   #[error("{operation} is not supported for {address}")]
   UnsupportedOperation {
      operation: &'static str,
      address: String,
   },

   /// A supplied field value breaks the pet invariants.
   #[error("invalid {field}: {reason}")]
   InvalidField { field: &'static str, reason: String },

   /// Payload or projection names a column the pets table does not have.
   #[error("unknown column: {0}")]
   UnknownColumn(String),

   /// The database could not be opened or its schema could not be applied.
   #[error("storage unavailable: {0}")]
   StorageUnavailable(#[from] shelter_conn_mgr::Error),

   /// Error from SQLx operations.
   #[error(transparent)]
   Sqlx(#[from] sqlx::Error),

   /// SQLite type that cannot be mapped to JSON.
   #[error("unsupported datatype: {0}")]
   UnsupportedDatatype(String),

   /// A decoded row could not be turned into a typed record.
   #[error("decode error: {0}")]
   Decode(#[from] serde_json::Error),

   /// Configuration file could not be parsed.
   #[error("invalid configuration: {0}")]
   Config(String),

   /// I/O error when reading configuration or database files.
   #[error("io error: {0}")]
   Io(#[from] std::io::Error),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for callers and the CLI.
   pub fn error_code(&self) -> String {
      match self {
         Error::UnrecognizedAddress(_) => "UNRECOGNIZED_ADDRESS".to_string(),
         Error::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION".to_string(),
         Error::InvalidField { .. } => "INVALID_FIELD".to_string(),
         Error::UnknownColumn(_) => "UNKNOWN_COLUMN".to_string(),
         Error::StorageUnavailable(_) => "STORAGE_UNAVAILABLE".to_string(),
         Error::Sqlx(e) => {
            if let Some(code) = e.as_database_error().and_then(|db_err| db_err.code()) {
               return format!("SQLITE_{}", code);
            }
            "SQLX_ERROR".to_string()
         }
         Error::UnsupportedDatatype(_) => "UNSUPPORTED_DATATYPE".to_string(),
         Error::Decode(_) => "DECODE_ERROR".to_string(),
         Error::Config(_) => "CONFIG_ERROR".to_string(),
         Error::Io(_) => "IO_ERROR".to_string(),
      }
   }

   /// Name of the offending field, for validation failures.
   pub fn invalid_field(&self) -> Option<&'static str> {
      match self {
         Error::InvalidField { field, .. } => Some(*field),
         _ => None,
      }
   }
}
