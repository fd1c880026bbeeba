//! Synchronous multicast signal with explicit subscription handles.
//!
//! A [`Signal`] is the publish side of the change-notification protocol. It is
//! a cheap-to-clone handle: clones share the same subscriber list, so an entity
//! can hand its signal to observers without giving out the entity itself.
//!
//! ## Re-entrancy
//!
//! `emit` snapshots the subscriber list before dispatch and releases every
//! internal borrow while handlers run. Handlers may therefore subscribe,
//! unsubscribe, mutate the emitting entity, or emit again. A handler removed by
//! an earlier handler during the same dispatch is not called.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::mpsc;

use crate::subscription::Subscription;

type Handler<E> = Rc<dyn Fn(&E)>;

/// Token returned by [`Signal::subscribe`]; pass it back to unsubscribe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

struct Inner<E> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(SubscriptionHandle, Handler<E>)>>,
}

impl<E> Inner<E> {
    fn remove(&self, handle: SubscriptionHandle) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _)| *h != handle);
        handlers.len() != before
    }

    fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.handlers.borrow().iter().any(|(h, _)| *h == handle)
    }
}

pub struct Signal<E> {
    inner: Rc<Inner<E>>,
}

impl<E: 'static> Signal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler`; it runs for every subsequent `emit` until the
    /// returned handle is passed to [`Signal::unsubscribe`].
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionHandle
    where
        F: Fn(&E) + 'static,
    {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        let handle = SubscriptionHandle(id);
        self.inner
            .handlers
            .borrow_mut()
            .push((handle, Rc::new(handler)));
        handle
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        self.inner.remove(handle)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    /// Deliver `event` to every live subscriber, in subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(SubscriptionHandle, Handler<E>)> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(h, f)| (*h, Rc::clone(f)))
            .collect();

        for (handle, handler) in snapshot {
            if self.inner.contains(handle) {
                handler(event);
            }
        }
    }

    /// Open a channel-backed subscription that buffers every emitted event.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes it.
    pub fn listen(&self) -> Subscription<E>
    where
        E: Clone,
    {
        let (tx, rx) = mpsc::channel();
        let handle = self.subscribe(move |event: &E| {
            // Receiver gone means the subscription is being torn down.
            let _ = tx.send(event.clone());
        });

        let weak: Weak<Inner<E>> = Rc::downgrade(&self.inner);
        Subscription::with_detach(rx, move || {
            if let Some(inner) = weak.upgrade() {
                inner.remove(handle);
            }
        })
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(Inner {
                next_id: Cell::new(0),
                handlers: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl<E> core::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.inner.handlers.borrow().len())
            .finish()
    }
}
