use thiserror::Error;

use tableside_core::DomainError;

/// Failures inside workspace commands.
///
/// These never escape a command: the command boundary reports them through
/// the dialog and the error log.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("tables tab index must be 0 or 1, got {0}")]
    InvalidTab(usize),
}
