//! Change notifications keyed by content address.
//!
//! Writers announce "data reachable through this address may have changed"
//! by calling [`ChangeBroker::notify_change`]. Interested parties either
//! register a synchronous callback for an address (and optionally everything
//! beneath it) or consume an async [`ChangeStream`].
//!
//! Addresses are plain strings with `/`-separated segments, e.g.
//! `content://com.example.android.pets/pets/7`. An address is *beneath*
//! another when it extends it by one or more whole segments.
//!
//! # Delivery rules
//!
//! A notification for address `N` reaches an observer registered on `O` when:
//!
//! - `O == N`, or
//! - `O` is beneath `N` (a collection change may affect any of its items), or
//! - `N` is beneath `O` and the observer asked for descendants.
//!
//! Callbacks run synchronously on the notifying thread, outside any internal
//! lock, so they may register or drop subscriptions themselves.

pub mod broker;
pub mod change;
pub mod config;
pub mod stream;
pub mod subscription;

pub use broker::{ChangeBroker, uri_matches};
pub use change::{ChangeNotification, ChangeOperation};
pub use config::ObserverConfig;
pub use stream::ChangeStream;
pub use subscription::{ObserverId, Subscription};
