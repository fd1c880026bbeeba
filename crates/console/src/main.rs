use std::cell::RefCell;
use std::rc::Rc;

use tableside_console::{Console, ConsoleDialog, SharedInput, SharedOutput, catalog};
use tableside_workspace::{Workspace, WorkspaceConfig};

fn main() -> anyhow::Result<()> {
    tableside_observability::init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = tokio::task::LocalSet::new();

    let config = WorkspaceConfig::default();
    let error_log = config.error_log();
    let result = local.block_on(&runtime, run(config));
    if let Err(error) = &result {
        tracing::error!(error = %format!("{error:#}"), "console terminated");
        error_log.log(&format!("UnhandledException: {error:#}"));
    }
    result
}

async fn run(config: WorkspaceConfig) -> anyhow::Result<()> {
    let input: SharedInput = Rc::new(RefCell::new(std::io::stdin().lock()));
    let output: SharedOutput = Rc::new(RefCell::new(std::io::stdout()));

    let catalog = catalog(&config, &std::env::current_dir()?);
    tracing::info!(base_dir = %config.base_dir.display(), "starting console");

    let dialog = ConsoleDialog::new(input.clone(), output.clone());
    let mut workspace = Workspace::new(Box::new(dialog), config);
    workspace.load_products(&catalog).await;

    Console::new(workspace, input, output).run().await
}
