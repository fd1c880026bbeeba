//! `tableside-workspace` — the waiter's in-memory workspace.
//!
//! [`Workspace`] owns the open and completed tables, the current selection, the
//! product picker state and the transient status line. Mutations go through
//! [`WorkspaceCommand`]s whose enablement (`can_execute`) observers re-query
//! whenever the workspace publishes [`WorkspaceEvent::CommandsInvalidated`].
//!
//! The workspace is single-threaded: entities are `Rc` handles, and the status
//! ticker schedules its auto-clear timer with `tokio::task::spawn_local`, so
//! commands must run inside a `tokio::task::LocalSet`.

pub mod command;
pub mod config;
pub mod dialog;
pub mod error;
pub mod event;
pub mod status;
pub mod workspace;

pub use command::WorkspaceCommand;
pub use config::WorkspaceConfig;
pub use dialog::{Dialog, normalize_input};
pub use error::WorkspaceError;
pub use event::{TablesTab, WorkspaceEvent, WorkspaceProperty};
pub use status::StatusTicker;
pub use workspace::{Workspace, WorkspaceSnapshot};
