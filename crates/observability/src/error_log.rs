//! Append-only error log.
//!
//! Each record is one line: a local ISO-8601 timestamp (seconds precision), a
//! space, and the message. Write failures are ignored; the log must never take
//! the workspace down with it.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// File name of the error log below the application base directory.
pub const ERROR_LOG_FILE_NAME: &str = "app-errors.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<base_dir>/app-errors.log`.
    pub fn in_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self::new(base_dir.as_ref().join(ERROR_LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with the current local time.
    pub fn log(&self, message: &str) {
        self.log_at(Local::now(), message);
    }

    pub fn log_at(&self, at: DateTime<Local>, message: &str) {
        let record = format_record(at, message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(record.as_bytes()));

        if let Err(err) = written {
            ::tracing::debug!(path = %self.path.display(), error = %err, "error log write failed");
        }
    }
}

fn format_record(at: DateTime<Local>, message: &str) -> String {
    format!("{} {}\n", at.format(TIMESTAMP_FORMAT), message)
}
