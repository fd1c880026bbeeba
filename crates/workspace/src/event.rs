use serde::{Deserialize, Serialize};

use tableside_dining::Table;
use tableside_events::{CollectionChange, Event};

use crate::error::WorkspaceError;

/// Which table collection the selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TablesTab {
    #[default]
    Open,
    Completed,
}

impl TablesTab {
    pub fn index(self) -> usize {
        match self {
            TablesTab::Open => 0,
            TablesTab::Completed => 1,
        }
    }
}

impl TryFrom<usize> for TablesTab {
    type Error = WorkspaceError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(TablesTab::Open),
            1 => Ok(TablesTab::Completed),
            other => Err(WorkspaceError::InvalidTab(other)),
        }
    }
}

/// Observable workspace state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceProperty {
    SelectedTable,
    SelectedOrder,
    SelectedOrderItem,
    SelectedProduct,
    TablesTabIndex,
    /// Derived: the selected table is an open table.
    CanModifySelection,
    Products,
    ProductSearchText,
    /// The filtered product view must be re-read.
    ProductsView,
    StatusMessage,
}

/// Change published by the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    Property(WorkspaceProperty),
    OpenTables(CollectionChange<Table>),
    CompletedTables(CollectionChange<Table>),
    /// Command predicates may have changed; re-query `can_execute`.
    CommandsInvalidated,
}

impl WorkspaceEvent {
    pub fn is_property(&self, property: WorkspaceProperty) -> bool {
        matches!(self, WorkspaceEvent::Property(p) if *p == property)
    }
}

impl Event for WorkspaceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            WorkspaceEvent::Property(property) => match property {
                WorkspaceProperty::SelectedTable => "workspace.selected_table",
                WorkspaceProperty::SelectedOrder => "workspace.selected_order",
                WorkspaceProperty::SelectedOrderItem => "workspace.selected_order_item",
                WorkspaceProperty::SelectedProduct => "workspace.selected_product",
                WorkspaceProperty::TablesTabIndex => "workspace.tables_tab_index",
                WorkspaceProperty::CanModifySelection => "workspace.can_modify_selection",
                WorkspaceProperty::Products => "workspace.products",
                WorkspaceProperty::ProductSearchText => "workspace.product_search_text",
                WorkspaceProperty::ProductsView => "workspace.products_view",
                WorkspaceProperty::StatusMessage => "workspace.status_message",
            },
            WorkspaceEvent::OpenTables(_) => "workspace.open_tables",
            WorkspaceEvent::CompletedTables(_) => "workspace.completed_tables",
            WorkspaceEvent::CommandsInvalidated => "workspace.commands_invalidated",
        }
    }
}
