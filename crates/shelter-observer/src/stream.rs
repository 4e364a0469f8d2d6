use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::broadcast;
use tokio_stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::broker::uri_matches;
use crate::change::ChangeNotification;

/// A stream of change notifications narrowed to one address.
///
/// Wraps a `BroadcastStream` and keeps notifications on that address, on its
/// ancestors, and on anything beneath it.
pub struct ChangeStream {
   inner: BroadcastStream<ChangeNotification>,
   filter_uri: String,
}

impl ChangeStream {
   pub(crate) fn new(rx: broadcast::Receiver<ChangeNotification>, uri: String) -> Self {
      Self {
         inner: BroadcastStream::new(rx),
         filter_uri: uri,
      }
   }
}

impl Stream for ChangeStream {
   type Item = ChangeNotification;

   fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
      loop {
         // BroadcastStream is Unpin
         let inner = Pin::new(&mut self.inner);

         match inner.poll_next(cx) {
            Poll::Ready(Some(Ok(change))) => {
               if !uri_matches(&self.filter_uri, &change.uri, true) {
                  continue;
               }
               return Poll::Ready(Some(change));
            }
            Poll::Ready(Some(Err(err))) => {
               warn!(
                  error = %err,
                  "Change stream lagged and skipped notifications; consider a larger channel_capacity"
               );
               continue;
            }
            Poll::Ready(None) => return Poll::Ready(None),
            Poll::Pending => return Poll::Pending,
         }
      }
   }
}
