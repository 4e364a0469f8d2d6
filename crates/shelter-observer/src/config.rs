/// Configuration for the change broker.
#[derive(Debug, Clone)]
pub struct ObserverConfig {
   /// Capacity of the broadcast channel feeding [`ChangeStream`]s.
   ///
   /// Synchronous callbacks are unaffected. A stream that falls more than
   /// this many notifications behind skips the missed ones and logs a
   /// warning; re-query current state if that matters.
   ///
   /// Default: 256.
   ///
   /// [`ChangeStream`]: crate::ChangeStream
   pub channel_capacity: usize,
}

impl Default for ObserverConfig {
   fn default() -> Self {
      Self {
         channel_capacity: 256,
      }
   }
}

impl ObserverConfig {
   /// Creates a new observer configuration with default settings.
   pub fn new() -> Self {
      Self::default()
   }

   /// Sets the broadcast channel capacity for change notifications.
   pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
      self.channel_capacity = capacity;
      self
   }
}
