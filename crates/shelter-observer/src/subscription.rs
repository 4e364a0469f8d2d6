use std::sync::Weak;

use crate::broker::ChangeBroker;

/// Identifier of one registered observer.
pub type ObserverId = u64;

/// RAII handle for a registered observer.
///
/// Dropping the handle unregisters the callback. If the broker is already
/// gone the drop is a no-op.
#[must_use = "dropping a Subscription immediately unregisters its observer"]
#[derive(Debug)]
pub struct Subscription {
   id: ObserverId,
   broker: Weak<ChangeBroker>,
}

impl Subscription {
   pub(crate) fn new(id: ObserverId, broker: Weak<ChangeBroker>) -> Self {
      Self { id, broker }
   }

   pub fn id(&self) -> ObserverId {
      self.id
   }

   /// Returns true while the observer is still registered.
   pub fn is_active(&self) -> bool {
      self
         .broker
         .upgrade()
         .is_some_and(|broker| broker.is_registered(self.id))
   }
}

impl Drop for Subscription {
   fn drop(&mut self) {
      if let Some(broker) = self.broker.upgrade() {
         broker.unregister(self.id);
      }
   }
}
