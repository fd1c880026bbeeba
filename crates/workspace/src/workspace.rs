//! The waiter's workspace: tables, selection, product picker, commands.

use std::time::Duration;

use serde::Serialize;

use tableside_catalog::{CatalogSource, Product, ProductFilter, ProductsView};
use tableside_core::{DomainError, Entity};
use tableside_dining::{MIN_QUANTITY, NewOrderItem, Order, OrderItem, Table, TableSnapshot};
use tableside_events::{CollectionChange, Signal};
use tableside_observability::ErrorLog;

use crate::command::WorkspaceCommand;
use crate::config::WorkspaceConfig;
use crate::dialog::{Dialog, normalize_input};
use crate::error::WorkspaceError;
use crate::event::{TablesTab, WorkspaceEvent, WorkspaceProperty};
use crate::status::StatusTicker;

const TABLE_NAME_PROMPT: &str = "Table name:";

pub struct Workspace {
    dialog: Box<dyn Dialog>,
    config: WorkspaceConfig,
    error_log: ErrorLog,

    open_tables: Vec<Table>,
    completed_tables: Vec<Table>,
    tables_tab: TablesTab,

    selected_table: Option<Table>,
    selected_order: Option<Order>,
    selected_order_item: Option<OrderItem>,

    products: Vec<Product>,
    product_filter: ProductFilter,
    selected_product: Option<Product>,

    status: StatusTicker,
    changes: Signal<WorkspaceEvent>,
}

impl Workspace {
    pub fn new(dialog: Box<dyn Dialog>, config: WorkspaceConfig) -> Self {
        let changes = Signal::new();
        Self {
            dialog,
            error_log: config.error_log(),
            config,
            open_tables: Vec::new(),
            completed_tables: Vec::new(),
            tables_tab: TablesTab::Open,
            selected_table: None,
            selected_order: None,
            selected_order_item: None,
            products: Vec::new(),
            product_filter: ProductFilter::default(),
            selected_product: None,
            status: StatusTicker::new(changes.clone()),
            changes,
        }
    }

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    pub fn changes(&self) -> &Signal<WorkspaceEvent> {
        &self.changes
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn open_tables(&self) -> &[Table] {
        &self.open_tables
    }

    pub fn completed_tables(&self) -> &[Table] {
        &self.completed_tables
    }

    pub fn tables(&self, tab: TablesTab) -> &[Table] {
        match tab {
            TablesTab::Open => &self.open_tables,
            TablesTab::Completed => &self.completed_tables,
        }
    }

    pub fn tables_tab(&self) -> TablesTab {
        self.tables_tab
    }

    pub fn tables_tab_index(&self) -> usize {
        self.tables_tab.index()
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selected_table.as_ref()
    }

    pub fn selected_order(&self) -> Option<&Order> {
        self.selected_order.as_ref()
    }

    pub fn selected_order_item(&self) -> Option<&OrderItem> {
        self.selected_order_item.as_ref()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }

    pub fn product_search_text(&self) -> &str {
        self.product_filter.search_text()
    }

    /// Products whose name contains the search text, ignoring case.
    pub fn products_view(&self) -> ProductsView<'_> {
        self.product_filter.view(&self.products)
    }

    pub fn status_message(&self) -> String {
        self.status.message()
    }

    /// True iff the selected table is one of the open tables.
    pub fn can_modify_selection(&self) -> bool {
        self.selected_table
            .as_ref()
            .is_some_and(|table| self.open_tables.contains(table))
    }

    /// True iff a table other than `exclude` already uses `name`, ignoring
    /// case. Only open tables are considered.
    pub fn table_name_exists(&self, name: &str, exclude: Option<&Table>) -> bool {
        self.open_tables
            .iter()
            .filter(|table| Some(*table) != exclude)
            .any(|table| table.has_name(name))
    }

    // ---------------------------------------------------------------------
    // Commands
    // ---------------------------------------------------------------------

    pub fn can_execute(&self, command: WorkspaceCommand) -> bool {
        match command {
            WorkspaceCommand::CreateTable => true,
            WorkspaceCommand::EditTable
            | WorkspaceCommand::DeleteTable
            | WorkspaceCommand::AddOrderItem => self.can_modify_selection(),
            WorkspaceCommand::CompleteTable => {
                self.can_modify_selection()
                    && self
                        .selected_order
                        .as_ref()
                        .is_some_and(|order| !order.is_empty())
            }
            WorkspaceCommand::RemoveOrderItem => {
                self.can_modify_selection() && self.selected_order_item.is_some()
            }
        }
    }

    /// Enablement of every command, in [`WorkspaceCommand::ALL`] order.
    pub fn command_states(&self) -> Vec<(WorkspaceCommand, bool)> {
        WorkspaceCommand::ALL
            .iter()
            .map(|command| (*command, self.can_execute(*command)))
            .collect()
    }

    /// Run `command`. Disabled commands do nothing, except `CompleteTable`,
    /// which tells the user why it cannot run.
    pub fn execute(&mut self, command: WorkspaceCommand) {
        tracing::debug!(command = %command, "execute");
        match command {
            WorkspaceCommand::CreateTable => self.create_table(),
            WorkspaceCommand::EditTable => self.edit_table(),
            WorkspaceCommand::DeleteTable => self.delete_table(),
            WorkspaceCommand::CompleteTable => self.complete_table(),
            WorkspaceCommand::AddOrderItem => self.add_order_item(),
            WorkspaceCommand::RemoveOrderItem => self.remove_order_item(),
        }
    }

    pub fn create_table(&mut self) {
        let Some(name) = self.prompt_table_name("New Table", None) else {
            return;
        };
        if self.table_name_exists(&name, None) {
            self.show_duplicate_name(&name);
            return;
        }

        let table = Table::new(name.clone());
        self.open_tables.push(table.clone());
        self.changes.emit(&WorkspaceEvent::OpenTables(CollectionChange::Added {
            index: self.open_tables.len() - 1,
            item: table.clone(),
        }));
        tracing::info!(table = %name, "table created");

        self.set_tables_tab(TablesTab::Open);
        self.set_selected_table(Some(table));
        self.show_status(format!("Created table \"{name}\""));
    }

    pub fn edit_table(&mut self) {
        if !self.can_execute(WorkspaceCommand::EditTable) {
            return;
        }
        let Some(table) = self.selected_table.clone() else {
            return;
        };

        let current = table.name();
        let Some(name) = self.prompt_table_name("Rename Table", Some(&current)) else {
            return;
        };
        if self.table_name_exists(&name, Some(&table)) {
            self.show_duplicate_name(&name);
            return;
        }

        table.set_name(name.clone());
        tracing::info!(from = %current, to = %name, "table renamed");
        self.show_status(format!("Renamed table to \"{name}\""));
    }

    pub fn delete_table(&mut self) {
        if !self.can_execute(WorkspaceCommand::DeleteTable) {
            return;
        }
        let Some(table) = self.selected_table.clone() else {
            return;
        };

        let name = table.name();
        let question = format!("Delete \"{name}\" and all its orders?");
        if !self.dialog.confirm("Delete Table", &question) {
            return;
        }

        let Some(index) = self.open_tables.iter().position(|t| *t == table) else {
            return;
        };
        let removed = self.open_tables.remove(index);
        self.changes.emit(&WorkspaceEvent::OpenTables(CollectionChange::Removed {
            index,
            item: removed,
        }));
        tracing::info!(table = %name, "table deleted");

        self.set_tables_tab(TablesTab::Open);
        let next = self.open_tables.first().cloned();
        self.set_selected_table(next);
        self.show_status(format!("Deleted \"{name}\""));
    }

    pub fn complete_table(&mut self) {
        if !self.can_execute(WorkspaceCommand::CompleteTable) {
            self.dialog.show_message(
                "Cannot complete",
                "Cannot complete — add at least one item before completing the table.",
            );
            return;
        }
        let Some(table) = self.selected_table.clone() else {
            return;
        };
        let Some(index) = self.open_tables.iter().position(|t| *t == table) else {
            return;
        };

        let name = table.name();
        let moved = self.open_tables.remove(index);
        self.changes.emit(&WorkspaceEvent::OpenTables(CollectionChange::Removed {
            index,
            item: moved.clone(),
        }));
        self.completed_tables.push(moved.clone());
        self.changes
            .emit(&WorkspaceEvent::CompletedTables(CollectionChange::Added {
                index: self.completed_tables.len() - 1,
                item: moved,
            }));
        tracing::info!(table = %name, total = %table.first_order().map(|o| o.total()).unwrap_or_default(), "table completed");

        // The table stays selected, now read-only.
        self.set_tables_tab(TablesTab::Completed);
        self.emit(WorkspaceProperty::CanModifySelection);
        self.changes.emit(&WorkspaceEvent::CommandsInvalidated);
        self.show_status(format!("Completed \"{name}\""));
    }

    pub fn add_order_item(&mut self) {
        if !self.can_execute(WorkspaceCommand::AddOrderItem) {
            return;
        }
        if let Err(error) = self.try_add_order_item() {
            self.report_failure("Error adding item", "AddOrderItem", &error);
        }
    }

    fn try_add_order_item(&mut self) -> Result<(), WorkspaceError> {
        let Some(product) = self.selected_product.clone() else {
            self.dialog
                .show_message("No product selected", "Please select a product to add.");
            return Ok(());
        };
        let Some(table) = self.selected_table.clone() else {
            self.dialog.show_message(
                "No table selected",
                "Please select a table before adding items.",
            );
            return Ok(());
        };

        let order = match table.order_count() {
            0 => {
                let order = Order::new();
                table.push_order(order.clone());
                order
            }
            1 => table
                .first_order()
                .ok_or_else(|| DomainError::not_found("table order"))?,
            n => {
                return Err(DomainError::invariant(format!(
                    "table \"{}\" has {n} orders, expected at most one",
                    table.name()
                ))
                .into());
            }
        };
        if order.total().checked_add(product.price).is_none() {
            return Err(DomainError::validation(format!(
                "adding \"{}\" would overflow the order total",
                product.name
            ))
            .into());
        }
        if self.selected_order.as_ref() != Some(&order) {
            self.set_selected_order(Some(order.clone()));
        }

        let existing = order.find(|item| {
            let product_id = item.product_id();
            (product_id != 0 && product_id == product.id)
                || (product_id == 0 && item.name() == product.name)
        });

        let status = match existing {
            Some(item) => {
                let quantity = item.increment_quantity()?;
                let status = format!(
                    "Increased quantity of \"{}\" to {quantity}",
                    item.name()
                );
                self.set_selected_order_item(Some(item));
                status
            }
            None => {
                let item = OrderItem::new(NewOrderItem {
                    product_id: product.id,
                    name: product.name.clone(),
                    price: product.price,
                    quantity: MIN_QUANTITY,
                });
                order.push(item.clone());
                let status = format!("Added \"{}\" to order", item.name());
                self.set_selected_order_item(Some(item));
                status
            }
        };
        tracing::info!(table = %table.name(), product = product.id, total = %order.total(), "order updated");

        self.set_selected_product(None);
        self.set_product_search_text("");
        self.changes.emit(&WorkspaceEvent::CommandsInvalidated);
        self.show_status(status);
        Ok(())
    }

    pub fn remove_order_item(&mut self) {
        if !self.can_execute(WorkspaceCommand::RemoveOrderItem) {
            return;
        }
        let (Some(order), Some(item)) = (
            self.selected_order.clone(),
            self.selected_order_item.clone(),
        ) else {
            return;
        };

        if !order.remove(&item) {
            tracing::debug!(item = %item.id(), "selected item not in selected order");
            return;
        }
        let name = item.name();
        tracing::info!(item = %name, total = %order.total(), "order item removed");

        self.set_selected_order_item(None);
        self.show_status(format!("Removed \"{name}\" from order"));
    }

    /// Host-side quantity edit of the selected item; clamped to at least one.
    /// Returns `false` when there is nothing editable selected.
    pub fn set_selected_item_quantity(&mut self, quantity: i32) -> bool {
        if !self.can_modify_selection() {
            return false;
        }
        let Some(item) = self.selected_order_item.as_ref() else {
            return false;
        };
        item.set_quantity(quantity);
        true
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Select `table` (or nothing). The table must belong to the active tab's
    /// collection. The order selection follows the table's first order and the
    /// item selection is cleared.
    pub fn set_selected_table(&mut self, table: Option<Table>) {
        if self.selected_table == table {
            return;
        }
        if let Some(candidate) = &table {
            if !self.tables(self.tables_tab).contains(candidate) {
                tracing::debug!(
                    table = %candidate.name(),
                    tab = ?self.tables_tab,
                    "ignoring selection outside the active tab"
                );
                return;
            }
        }

        tracing::debug!(table = ?table.as_ref().map(Table::name), "table selected");
        self.selected_order = table.as_ref().and_then(Table::first_order);
        self.selected_order_item = None;
        self.selected_table = table;

        self.emit(WorkspaceProperty::SelectedTable);
        self.emit(WorkspaceProperty::SelectedOrder);
        self.emit(WorkspaceProperty::SelectedOrderItem);
        self.emit(WorkspaceProperty::CanModifySelection);
        self.changes.emit(&WorkspaceEvent::CommandsInvalidated);
    }

    /// Switch tabs. A selection outside the new tab's collection moves to that
    /// collection's first table, or to nothing.
    pub fn set_tables_tab(&mut self, tab: TablesTab) {
        if self.tables_tab != tab {
            self.tables_tab = tab;
            self.emit(WorkspaceProperty::TablesTabIndex);
        }

        let stale = self
            .selected_table
            .as_ref()
            .is_some_and(|table| !self.tables(tab).contains(table));
        if stale {
            let next = self.tables(tab).first().cloned();
            self.set_selected_table(next);
        }
    }

    pub fn set_tables_tab_index(&mut self, index: usize) -> Result<(), WorkspaceError> {
        let tab = TablesTab::try_from(index)?;
        self.set_tables_tab(tab);
        Ok(())
    }

    /// Must be an order of the selected table. Clears the item selection.
    pub fn set_selected_order(&mut self, order: Option<Order>) {
        if self.selected_order == order {
            return;
        }
        if let Some(candidate) = &order {
            let owned = self
                .selected_table
                .as_ref()
                .is_some_and(|table| table.has_order(candidate));
            if !owned {
                tracing::debug!(order = %candidate.id(), "ignoring order outside selected table");
                return;
            }
        }

        self.selected_order = order;
        self.selected_order_item = None;
        self.emit(WorkspaceProperty::SelectedOrder);
        self.emit(WorkspaceProperty::SelectedOrderItem);
        self.changes.emit(&WorkspaceEvent::CommandsInvalidated);
    }

    /// Must be an item of the selected order.
    pub fn set_selected_order_item(&mut self, item: Option<OrderItem>) {
        if self.selected_order_item == item {
            return;
        }
        if let Some(candidate) = &item {
            let owned = self
                .selected_order
                .as_ref()
                .is_some_and(|order| order.contains(candidate));
            if !owned {
                tracing::debug!(item = %candidate.id(), "ignoring item outside selected order");
                return;
            }
        }

        self.selected_order_item = item;
        self.emit(WorkspaceProperty::SelectedOrderItem);
        self.changes.emit(&WorkspaceEvent::CommandsInvalidated);
    }

    /// Must be one of the loaded products.
    pub fn set_selected_product(&mut self, product: Option<Product>) {
        if self.selected_product == product {
            return;
        }
        if let Some(candidate) = &product {
            if !self.products.contains(candidate) {
                tracing::debug!(product = candidate.id, "ignoring unknown product");
                return;
            }
        }

        self.selected_product = product;
        self.emit(WorkspaceProperty::SelectedProduct);
    }

    pub fn set_product_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.product_filter.search_text() == text {
            return;
        }
        self.product_filter = ProductFilter::new(text);
        self.emit(WorkspaceProperty::ProductSearchText);
        self.emit(WorkspaceProperty::ProductsView);
    }

    // ---------------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------------

    /// Load the product set from `source`. Failures leave the current products
    /// untouched.
    pub async fn load_products(&mut self, source: &dyn CatalogSource) {
        match source.load_products().await {
            Ok(products) => {
                tracing::info!(count = products.len(), "products loaded");
                self.replace_products(products);
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to load products");
            }
        }
    }

    /// Replace the product set and select its first product.
    pub fn replace_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.emit(WorkspaceProperty::Products);
        self.emit(WorkspaceProperty::ProductsView);

        let first = self.products.first().cloned();
        if self.selected_product != first {
            self.selected_product = first;
            self.emit(WorkspaceProperty::SelectedProduct);
        }
    }

    // ---------------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------------

    /// Show `message` for the configured duration.
    pub fn show_status(&mut self, message: impl Into<String>) {
        let duration = self.config.status_duration;
        self.show_status_for(message, duration);
    }

    pub fn show_status_for(&mut self, message: impl Into<String>, duration: Duration) {
        self.status.show(message, duration);
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            open_tables: self.open_tables.iter().map(Table::snapshot).collect(),
            completed_tables: self.completed_tables.iter().map(Table::snapshot).collect(),
            tables_tab: self.tables_tab,
            selected_table: self.selected_table.as_ref().map(Table::name),
            selected_product: self.selected_product.clone(),
            product_search_text: self.product_filter.search_text().to_owned(),
            status_message: self.status.message(),
        }
    }

    fn prompt_table_name(&self, title: &str, current: Option<&str>) -> Option<String> {
        let raw = self.dialog.try_get_input(title, TABLE_NAME_PROMPT, current);
        normalize_input(raw.as_deref())
    }

    fn show_duplicate_name(&self, name: &str) {
        self.dialog.show_message(
            "Duplicate Name",
            &format!("A table named \"{name}\" already exists."),
        );
    }

    fn report_failure(&self, title: &str, command: &str, error: &WorkspaceError) {
        let details = error.to_string();
        tracing::error!(command, error = %details, "command failed");
        self.dialog.show_message(title, &details);
        self.error_log.log(&format!("{command} exception: {details}"));
    }

    fn emit(&self, property: WorkspaceProperty) {
        self.changes.emit(&WorkspaceEvent::Property(property));
    }
}

impl core::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Workspace")
            .field("open_tables", &self.open_tables)
            .field("completed_tables", &self.completed_tables)
            .field("tables_tab", &self.tables_tab)
            .field("selected_table", &self.selected_table)
            .field("products", &self.products.len())
            .finish_non_exhaustive()
    }
}

/// Serializable read model of the whole workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceSnapshot {
    pub open_tables: Vec<TableSnapshot>,
    pub completed_tables: Vec<TableSnapshot>,
    pub tables_tab: TablesTab,
    pub selected_table: Option<String>,
    pub selected_product: Option<Product>,
    pub product_search_text: String,
    pub status_message: String,
}
