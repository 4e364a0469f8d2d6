//! Observer registry and fan-out for change notifications.
//!
//! ```text
//!   writer ──► notify_change(uri) ──┬──► matching callbacks (sync, in caller)
//!                                   │
//!                                   └──► change_tx.send() ──► ChangeStream(s)
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::change::ChangeNotification;
use crate::config::ObserverConfig;
use crate::stream::ChangeStream;
use crate::subscription::{ObserverId, Subscription};

type Callback = Arc<dyn Fn(&ChangeNotification) + Send + Sync>;

struct Observer {
   uri: String,
   notify_for_descendants: bool,
   callback: Callback,
}

/// Returns true if `child` extends `parent` by at least one whole segment.
fn is_beneath(child: &str, parent: &str) -> bool {
   let parent = parent.trim_end_matches('/');
   child
      .strip_prefix(parent)
      .is_some_and(|rest| rest.starts_with('/') && rest.len() > 1)
}

/// Decides whether a notification on `notified` reaches an observer on `observed`.
pub fn uri_matches(observed: &str, notified: &str, notify_for_descendants: bool) -> bool {
   let observed_trimmed = observed.trim_end_matches('/');
   let notified_trimmed = notified.trim_end_matches('/');

   observed_trimmed == notified_trimmed
      || is_beneath(observed_trimmed, notified_trimmed)
      || (notify_for_descendants && is_beneath(notified_trimmed, observed_trimmed))
}

/// Registry of address observers plus a broadcast channel for streams.
pub struct ChangeBroker {
   observers: RwLock<HashMap<ObserverId, Observer>>,
   next_id: AtomicU64,
   change_tx: broadcast::Sender<ChangeNotification>,
}

impl ChangeBroker {
   /// Creates a new broker.
   pub fn new(config: &ObserverConfig) -> Arc<Self> {
      // broadcast::channel panics on zero capacity
      let (change_tx, _) = broadcast::channel(config.channel_capacity.max(1));
      Arc::new(Self {
         observers: RwLock::new(HashMap::new()),
         next_id: AtomicU64::new(1),
         change_tx,
      })
   }

   /// Registers `callback` for changes to `uri`.
   ///
   /// With `notify_for_descendants`, changes announced on addresses beneath
   /// `uri` are delivered as well. Changes announced on an ancestor of `uri`
   /// are always delivered.
   pub fn register<F>(
      self: &Arc<Self>,
      uri: impl Into<String>,
      notify_for_descendants: bool,
      callback: F,
   ) -> Subscription
   where
      F: Fn(&ChangeNotification) + Send + Sync + 'static,
   {
      let id = self.next_id.fetch_add(1, Ordering::Relaxed);
      let uri = uri.into();

      trace!(id, uri = %uri, notify_for_descendants, "Registering observer");
      self.observers.write().insert(
         id,
         Observer {
            uri,
            notify_for_descendants,
            callback: Arc::new(callback),
         },
      );

      Subscription::new(id, Arc::downgrade(self))
   }

   /// Removes an observer. Returns true if it was registered.
   pub fn unregister(&self, id: ObserverId) -> bool {
      let removed = self.observers.write().remove(&id).is_some();
      if removed {
         trace!(id, "Unregistered observer");
      }
      removed
   }

   pub fn is_registered(&self, id: ObserverId) -> bool {
      self.observers.read().contains_key(&id)
   }

   /// Number of registered observers.
   pub fn observer_count(&self) -> usize {
      self.observers.read().len()
   }

   /// Delivers `change` to every matching observer, then to stream subscribers.
   ///
   /// Returns how many callbacks were invoked.
   pub fn notify_change(&self, change: ChangeNotification) -> usize {
      let callbacks: Vec<Callback> = self
         .observers
         .read()
         .values()
         .filter(|observer| {
            uri_matches(&observer.uri, &change.uri, observer.notify_for_descendants)
         })
         .map(|observer| Arc::clone(&observer.callback))
         .collect();

      debug!(
         uri = %change.uri,
         operation = %change.operation,
         rows_affected = change.rows_affected,
         observers = callbacks.len(),
         "Notifying change"
      );

      for callback in &callbacks {
         callback(&change);
      }

      // No stream subscribers is not an error
      let _ = self.change_tx.send(change);

      callbacks.len()
   }

   /// Subscribes to notifications relevant to `uri` (descendants included) as a Stream.
   pub fn subscribe_stream(&self, uri: impl Into<String>) -> ChangeStream {
      ChangeStream::new(self.change_tx.subscribe(), uri.into())
   }
}

impl std::fmt::Debug for ChangeBroker {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("ChangeBroker")
         .field("observers", &self.observers.read().len())
         .field("stream_subscribers", &self.change_tx.receiver_count())
         .finish()
   }
}
