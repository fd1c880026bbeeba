//! Workspace configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tableside_catalog::JsonCatalog;
use tableside_catalog::json::products_path;
use tableside_observability::ErrorLog;
use tableside_observability::error_log::ERROR_LOG_FILE_NAME;

/// How long a status message stays up before it clears itself.
pub const DEFAULT_STATUS_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding `Data/products.json` and `app-errors.log`.
    pub base_dir: PathBuf,
    pub status_duration: Duration,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            status_duration: DEFAULT_STATUS_DURATION,
        }
    }
}

impl WorkspaceConfig {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_status_duration(mut self, status_duration: Duration) -> Self {
        self.status_duration = status_duration;
        self
    }

    pub fn products_path(&self) -> PathBuf {
        products_path(&self.base_dir)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.base_dir.join(ERROR_LOG_FILE_NAME)
    }

    pub fn catalog(&self) -> JsonCatalog {
        JsonCatalog::new(self.products_path())
    }

    pub fn error_log(&self) -> ErrorLog {
        ErrorLog::new(self.error_log_path())
    }
}

/// The executable's directory, or the current directory when it is unknown.
fn default_base_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
