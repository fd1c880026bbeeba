//! Verb parsing and the read-dispatch-render loop.

use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use tableside_dining::Table;
use tableside_events::Subscription;
use tableside_observability::ErrorLog;
use tableside_workspace::{
    TablesTab, Workspace, WorkspaceCommand, WorkspaceEvent, WorkspaceProperty,
};

use crate::dialog::{SharedInput, SharedOutput};

const HELP: &str = "\
commands:
  new | rename | delete | complete      manage the selected table
  add | remove                          add the selected product / remove the selected item
  select <n>                            select table n on the current tab
  tab open|completed                    switch tabs
  search [text]                         filter products (blank clears)
  product <n>                           pick product n from the filtered list
  item <n>                              select line n of the order
  qty <n>                               set the selected line's quantity
  show | json | help | quit
";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Command(WorkspaceCommand),
    /// 1-based index into the current tab's tables.
    Select(usize),
    Tab(TablesTab),
    Search(String),
    /// 1-based index into the filtered product list.
    Product(usize),
    /// 1-based index into the selected order's items.
    Item(usize),
    Quantity(i32),
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{verb}` expects {expected}")]
    Argument {
        verb: &'static str,
        expected: &'static str,
    },
}

impl FromStr for Verb {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let verb = match head.to_lowercase().as_str() {
            "new" => Verb::Command(WorkspaceCommand::CreateTable),
            "rename" => Verb::Command(WorkspaceCommand::EditTable),
            "delete" => Verb::Command(WorkspaceCommand::DeleteTable),
            "complete" => Verb::Command(WorkspaceCommand::CompleteTable),
            "add" => Verb::Command(WorkspaceCommand::AddOrderItem),
            "remove" => Verb::Command(WorkspaceCommand::RemoveOrderItem),
            "select" => Verb::Select(position(rest, "select")?),
            "product" => Verb::Product(position(rest, "product")?),
            "item" => Verb::Item(position(rest, "item")?),
            "tab" => Verb::Tab(tab(rest)?),
            "search" => Verb::Search(rest.to_string()),
            "qty" => Verb::Quantity(rest.parse().map_err(|_| ParseError::Argument {
                verb: "qty",
                expected: "a whole number",
            })?),
            "show" => Verb::Show,
            "json" => Verb::Json,
            "help" | "?" => Verb::Help,
            "quit" | "exit" => Verb::Quit,
            _ => return Err(ParseError::Unknown(head.to_string())),
        };
        Ok(verb)
    }
}

fn position(arg: &str, verb: &'static str) -> Result<usize, ParseError> {
    arg.parse::<usize>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(ParseError::Argument {
            verb,
            expected: "a number starting at 1",
        })
}

fn tab(arg: &str) -> Result<TablesTab, ParseError> {
    let invalid = ParseError::Argument {
        verb: "tab",
        expected: "`open` or `completed`",
    };
    match arg.to_lowercase().as_str() {
        "open" => Ok(TablesTab::Open),
        "completed" | "done" => Ok(TablesTab::Completed),
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|index| TablesTab::try_from(index).ok())
            .ok_or(invalid),
    }
}

/// The console host: owns the workspace and the console streams.
pub struct Console {
    workspace: Workspace,
    input: SharedInput,
    output: SharedOutput,
    events: Subscription<WorkspaceEvent>,
    error_log: ErrorLog,
}

impl Console {
    pub fn new(workspace: Workspace, input: SharedInput, output: SharedOutput) -> Self {
        let events = workspace.changes().listen();
        let error_log = workspace.config().error_log();
        Self {
            workspace,
            input,
            output,
            events,
            error_log,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Read verbs until `quit` or end of input.
    ///
    /// Must run inside a `tokio::task::LocalSet`.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.events.clear();
        self.write(&self.render())?;

        loop {
            self.write("> ")?;
            let Some(line) = self.read_line()? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let verb = match line.parse::<Verb>() {
                Ok(Verb::Quit) => break,
                Ok(verb) => verb,
                Err(error) => {
                    self.write(&format!("{error}\n"))?;
                    continue;
                }
            };

            if let Err(error) = self.dispatch(verb) {
                self.report_unhandled(&error);
            }
            let changes = self.describe_changes();
            self.write(&changes)?;

            // Let expired status timers run.
            tokio::task::yield_now().await;
        }

        tracing::info!("console closed");
        Ok(())
    }

    pub fn dispatch(&mut self, verb: Verb) -> anyhow::Result<()> {
        match verb {
            Verb::Command(command) => {
                if command != WorkspaceCommand::CompleteTable
                    && !self.workspace.can_execute(command)
                {
                    self.write(&format!("`{command}` is not available right now\n"))?;
                } else {
                    self.workspace.execute(command);
                }
            }
            Verb::Select(n) => {
                let tab = self.workspace.tables_tab();
                match self.workspace.tables(tab).get(n - 1).cloned() {
                    Some(table) => self.workspace.set_selected_table(Some(table)),
                    None => self.write(&format!("no table #{n} on this tab\n"))?,
                }
            }
            Verb::Tab(tab) => self.workspace.set_tables_tab(tab),
            Verb::Search(text) => {
                self.workspace.set_product_search_text(text);
                let first = self.workspace.products_view().first().cloned();
                self.workspace.set_selected_product(first);
            }
            Verb::Product(n) => {
                let product = self.workspace.products_view().iter().nth(n - 1).cloned();
                match product {
                    Some(product) => self.workspace.set_selected_product(Some(product)),
                    None => self.write(&format!("no product #{n} in the list\n"))?,
                }
            }
            Verb::Item(n) => {
                let item = self
                    .workspace
                    .selected_order()
                    .and_then(|order| order.items().get(n - 1).cloned());
                match item {
                    Some(item) => self.workspace.set_selected_order_item(Some(item)),
                    None => self.write(&format!("no line #{n} in the order\n"))?,
                }
            }
            Verb::Quantity(quantity) => {
                if !self.workspace.set_selected_item_quantity(quantity) {
                    self.write("select a line of an open table first\n")?;
                }
            }
            Verb::Show => self.write(&self.render())?,
            Verb::Json => {
                let json = serde_json::to_string_pretty(&self.workspace.snapshot())?;
                self.write(&format!("{json}\n"))?;
            }
            Verb::Help => self.write(HELP)?,
            Verb::Quit => {}
        }
        Ok(())
    }

    /// Text rendering of the current tab, the selected order and the picker.
    pub fn render(&self) -> String {
        let ws = &self.workspace;
        let mut out = String::new();

        let tab = ws.tables_tab();
        let label = match tab {
            TablesTab::Open => "Open tables",
            TablesTab::Completed => "Completed tables",
        };
        let _ = writeln!(out, "== {label} ==");
        for (i, table) in ws.tables(tab).iter().enumerate() {
            let marker = if ws.selected_table() == Some(table) { '*' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker} {}. {} ({:.2})",
                i + 1,
                table.name(),
                table_total(table)
            );
        }

        if let Some(order) = ws.selected_order() {
            let read_only = if ws.can_modify_selection() { "" } else { " [read-only]" };
            let _ = writeln!(out, "-- Order{read_only} --");
            for (i, item) in order.items().iter().enumerate() {
                let marker = if ws.selected_order_item() == Some(item) { '*' } else { ' ' };
                let _ = writeln!(
                    out,
                    "{marker} {}. {} x{} @ {:.2} = {:.2}",
                    i + 1,
                    item.name(),
                    item.quantity(),
                    item.price(),
                    item.total()
                );
            }
            let _ = writeln!(out, "  Total: {:.2}", order.total());
        }

        let search = ws.product_search_text();
        if search.is_empty() {
            let _ = writeln!(out, "-- Products --");
        } else {
            let _ = writeln!(out, "-- Products matching \"{search}\" --");
        }
        for (i, product) in ws.products_view().iter().enumerate() {
            let marker = if ws.selected_product() == Some(product) { '*' } else { ' ' };
            let _ = writeln!(out, "{marker} {}. {product}", i + 1);
        }

        let status = ws.status_message();
        if !status.is_empty() {
            let _ = writeln!(out, "status: {status}");
        }
        out
    }

    /// Summarize what changed since the last call.
    fn describe_changes(&mut self) -> String {
        let events = self.events.drain();
        let mut out = String::new();

        if events.iter().any(|e| e.is_property(WorkspaceProperty::StatusMessage)) {
            let status = self.workspace.status_message();
            if !status.is_empty() {
                let _ = writeln!(out, "status: {status}");
            }
        }
        if events.contains(&WorkspaceEvent::CommandsInvalidated) {
            let enabled: Vec<&str> = self
                .workspace
                .command_states()
                .into_iter()
                .filter(|(_, enabled)| *enabled)
                .map(|(command, _)| command.name())
                .collect();
            let _ = writeln!(out, "available: {}", enabled.join(", "));
        }
        out
    }

    fn report_unhandled(&self, error: &anyhow::Error) {
        tracing::error!(error = %format!("{error:#}"), "unhandled console failure");
        self.error_log
            .log(&format!("UnhandledException: {error:#}"));
        if let Err(write_error) = self.write(&format!("[Unexpected error] {error}\n")) {
            tracing::debug!(error = %write_error, "console write failed");
        }
    }

    fn write(&self, text: &str) -> std::io::Result<()> {
        let mut output = self.output.borrow_mut();
        output.write_all(text.as_bytes())?;
        output.flush()
    }

    fn read_line(&self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    }
}

fn table_total(table: &Table) -> Decimal {
    table.orders().iter().map(|order| order.total()).sum()
}
