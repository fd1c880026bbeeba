//! Channel-backed subscription to a [`crate::Signal`].
//!
//! A subscription buffers every event emitted after it was opened. It is meant
//! for observers that prefer to pull (presenters refreshing once per input
//! cycle, tests asserting on exact emission order) rather than react inline.
//!
//! ## Usage Pattern
//!
//! ```ignore
//! let changes = item.changes().listen();
//! item.set_price(Decimal::new(300, 2));
//!
//! for event in changes.drain() {
//!     refresh(event);
//! }
//! ```
//!
//! Messages are received in emission order. Dropping the subscription detaches
//! it from the signal.

use std::sync::mpsc::Receiver;

pub struct Subscription<M> {
    receiver: Receiver<M>,
    detach: Option<Box<dyn FnOnce()>>,
}

impl<M> Subscription<M> {
    /// Wrap `receiver`; `detach` runs when the subscription is dropped.
    pub fn with_detach(receiver: Receiver<M>, detach: impl FnOnce() + 'static) -> Self {
        Self {
            receiver,
            detach: Some(Box::new(detach)),
        }
    }

    /// Take every buffered message.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    /// Discard every buffered message.
    pub fn clear(&self) {
        while self.receiver.try_recv().is_ok() {}
    }
}

impl<M> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl<M> core::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
