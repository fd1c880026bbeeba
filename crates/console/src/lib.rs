//! Line-oriented host for the waiter workspace.
//!
//! Renders the workspace as text, maps typed verbs onto workspace commands and
//! answers dialog prompts from the same input stream.

use std::path::Path;

use tableside_catalog::JsonCatalog;
use tableside_catalog::json::products_path;
use tableside_workspace::WorkspaceConfig;

pub mod dialog;
pub mod repl;

pub use dialog::{ConsoleDialog, SharedInput, SharedOutput};
pub use repl::{Console, ParseError, Verb};

/// The configured catalog, falling back to `<working_dir>/Data/products.json`
/// when running from a checkout.
pub fn catalog(config: &WorkspaceConfig, working_dir: &Path) -> JsonCatalog {
    config.catalog().with_fallback(products_path(working_dir))
}
