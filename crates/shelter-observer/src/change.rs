use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOperation {
   Insert,
   Update,
   Delete,
}

impl ChangeOperation {
   pub fn as_str(&self) -> &'static str {
      match self {
         ChangeOperation::Insert => "insert",
         ChangeOperation::Update => "update",
         ChangeOperation::Delete => "delete",
      }
   }
}

impl std::fmt::Display for ChangeOperation {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.write_str(self.as_str())
   }
}

/// Notification that data reachable through `uri` may have changed.
///
/// `uri` is the address the write went through, not necessarily the
/// address of every affected row: a filtered update through the collection
/// address is reported on the collection address.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
   pub uri: String,
   pub operation: ChangeOperation,
   pub rows_affected: u64,
   pub timestamp: Instant,
}

impl ChangeNotification {
   pub fn new(uri: impl Into<String>, operation: ChangeOperation, rows_affected: u64) -> Self {
      Self {
         uri: uri.into(),
         operation,
         rows_affected,
         timestamp: Instant::now(),
      }
   }
}
