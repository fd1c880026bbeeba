//! Single-slot transient status line.
//!
//! Showing a message replaces the current one and (re)arms an auto-clear timer.
//! Only the newest timer may clear the line: every `show` cancels the pending
//! timer first. Timers run as local tasks on the workspace's `LocalSet`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tableside_events::Signal;

use crate::event::{WorkspaceEvent, WorkspaceProperty};

#[derive(Debug)]
pub struct StatusTicker {
    message: Rc<RefCell<String>>,
    pending: Option<CancellationToken>,
    changes: Signal<WorkspaceEvent>,
}

impl StatusTicker {
    /// Status changes are published on `changes` as
    /// `WorkspaceProperty::StatusMessage`.
    pub fn new(changes: Signal<WorkspaceEvent>) -> Self {
        Self {
            message: Rc::new(RefCell::new(String::new())),
            pending: None,
            changes,
        }
    }

    pub fn message(&self) -> String {
        self.message.borrow().clone()
    }

    /// Show `message` for `duration`, replacing whatever is up.
    ///
    /// Must be called from within a `tokio::task::LocalSet`.
    pub fn show(&mut self, message: impl Into<String>, duration: Duration) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }

        let message = message.into();
        tracing::info!(status = %message, "status");
        set_message(&self.message, &self.changes, message);

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let slot = Rc::clone(&self.message);
        let changes = self.changes.clone();
        tokio::task::spawn_local(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    if !token.is_cancelled() {
                        set_message(&slot, &changes, String::new());
                    }
                }
            }
        });
    }

    /// Clear the line now and disarm the pending timer.
    pub fn clear(&mut self) {
        if let Some(previous) = self.pending.take() {
            previous.cancel();
        }
        set_message(&self.message, &self.changes, String::new());
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel();
        }
    }
}

fn set_message(slot: &RefCell<String>, changes: &Signal<WorkspaceEvent>, message: String) {
    {
        let mut current = slot.borrow_mut();
        if *current == message {
            return;
        }
        *current = message;
    }
    changes.emit(&WorkspaceEvent::Property(WorkspaceProperty::StatusMessage));
}
