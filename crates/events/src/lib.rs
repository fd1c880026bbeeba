//! `tableside-events` — change-notification protocol.
//!
//! Entities and the workspace publish tagged change events through a
//! [`Signal`]. Observers either register a callback (receiving a
//! [`SubscriptionHandle`] they must hand back to unsubscribe) or open a
//! channel-backed [`Subscription`] and drain it at their own pace.
//!
//! Everything here is single-threaded: emission is synchronous and happens in
//! the program order of the mutations that caused it.

pub mod change;
pub mod event;
pub mod signal;
pub mod subscription;

pub use change::{CollectionChange, Property, PropertyChanged};
pub use event::Event;
pub use signal::{Signal, SubscriptionHandle};
pub use subscription::Subscription;
