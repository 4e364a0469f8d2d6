use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shelter_observer::{ChangeBroker, Subscription};

use crate::Result;
use crate::record::{PetRecord, Row};

/// Forward-only result of a pet query.
///
/// Rows are fetched up front and handed out once each. While the cursor is
/// alive it watches its address (and anything beneath it), so a caller holding
/// a stale result can ask [`has_changed`](Self::has_changed) before re-querying.
#[derive(Debug)]
pub struct PetCursor {
   columns: Vec<String>,
   rows: std::vec::IntoIter<Row>,
   notification_uri: String,
   changed: Arc<AtomicBool>,
   _subscription: Subscription,
}

impl PetCursor {
   pub(crate) fn new(
      columns: Vec<String>,
      rows: Vec<Row>,
      notification_uri: String,
      broker: &Arc<ChangeBroker>,
   ) -> Self {
      let changed = Arc::new(AtomicBool::new(false));
      let flag = Arc::clone(&changed);
      let subscription = broker.register(notification_uri.clone(), true, move |_| {
         flag.store(true, Ordering::SeqCst);
      });

      Self {
         columns,
         rows: rows.into_iter(),
         notification_uri,
         changed,
         _subscription: subscription,
      }
   }

   /// Column names of every row, in order.
   pub fn columns(&self) -> &[String] {
      &self.columns
   }

   /// Address this cursor watches for changes.
   pub fn notification_uri(&self) -> &str {
      &self.notification_uri
   }

   /// True once a write has touched the watched address since the query ran.
   pub fn has_changed(&self) -> bool {
      self.changed.load(Ordering::SeqCst)
   }

   /// Consumes the remaining rows as typed records.
   ///
   /// Fails with a decode error if the query projected away any pet column.
   pub fn into_records(self) -> Result<Vec<PetRecord>> {
      self.rows.map(|row| PetRecord::from_row(&row)).collect()
   }
}

impl Iterator for PetCursor {
   type Item = Row;

   fn next(&mut self) -> Option<Self::Item> {
      self.rows.next()
   }

   fn size_hint(&self) -> (usize, Option<usize>) {
      self.rows.size_hint()
   }
}

impl ExactSizeIterator for PetCursor {}
