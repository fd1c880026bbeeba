use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use tableside_core::{Entity, TableId};
use tableside_events::{CollectionChange, Event, Property, PropertyChanged, Signal};

use crate::order::{Order, OrderSnapshot};

/// Observable fields of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableProperty {
    Name,
}

impl Property for TableProperty {
    fn event_type(&self) -> &'static str {
        match self {
            TableProperty::Name => "table.name",
        }
    }
}

/// Change published by a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableChange {
    Property(PropertyChanged<TableId, TableProperty>),
    Orders(CollectionChange<Order>),
}

impl Event for TableChange {
    fn event_type(&self) -> &'static str {
        match self {
            TableChange::Property(e) => e.event_type(),
            TableChange::Orders(CollectionChange::Added { .. }) => "table.order_added",
            TableChange::Orders(CollectionChange::Removed { .. }) => "table.order_removed",
            TableChange::Orders(CollectionChange::Reset) => "table.orders_reset",
        }
    }
}

struct Inner {
    id: TableId,
    name: RefCell<String>,
    orders: RefCell<Vec<Order>>,
    changes: Signal<TableChange>,
}

/// A named restaurant table and its orders.
///
/// The table does not limit how many orders it carries; the workspace keeps
/// it to at most one.
#[derive(Clone)]
pub struct Table {
    inner: Rc<Inner>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: TableId::new(),
                name: RefCell::new(name.into()),
                orders: RefCell::new(Vec::new()),
                changes: Signal::new(),
            }),
        }
    }

    pub fn name(&self) -> String {
        self.inner.name.borrow().clone()
    }

    /// Case-insensitive name comparison, as used for uniqueness checks.
    pub fn has_name(&self, name: &str) -> bool {
        self.inner.name.borrow().to_lowercase() == name.to_lowercase()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        {
            let mut current = self.inner.name.borrow_mut();
            if *current == name {
                return;
            }
            *current = name;
        }
        self.inner.changes.emit(&TableChange::Property(PropertyChanged::new(
            self.inner.id,
            TableProperty::Name,
        )));
    }

    pub fn changes(&self) -> &Signal<TableChange> {
        &self.inner.changes
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.orders.borrow().clone()
    }

    pub fn first_order(&self) -> Option<Order> {
        self.inner.orders.borrow().first().cloned()
    }

    pub fn order_count(&self) -> usize {
        self.inner.orders.borrow().len()
    }

    pub fn has_order(&self, order: &Order) -> bool {
        self.inner.orders.borrow().contains(order)
    }

    pub fn push_order(&self, order: Order) {
        let index = {
            let mut orders = self.inner.orders.borrow_mut();
            orders.push(order.clone());
            orders.len() - 1
        };
        self.inner
            .changes
            .emit(&TableChange::Orders(CollectionChange::Added { index, item: order }));
    }

    pub fn remove_order(&self, order: &Order) -> bool {
        let removed = {
            let mut orders = self.inner.orders.borrow_mut();
            orders
                .iter()
                .position(|o| o == order)
                .map(|index| (index, orders.remove(index)))
        };

        let Some((index, order)) = removed else {
            return false;
        };
        self.inner
            .changes
            .emit(&TableChange::Orders(CollectionChange::Removed { index, item: order }));
        true
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            id: self.inner.id,
            name: self.name(),
            orders: self.orders().iter().map(Order::snapshot).collect(),
        }
    }
}

impl Entity for Table {
    type Id = TableId;

    fn id(&self) -> Self::Id {
        self.inner.id
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Table {}

impl core::fmt::Debug for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.inner.id)
            .field("name", &*self.inner.name.borrow())
            .field("orders", &self.order_count())
            .finish()
    }
}

/// Point-in-time copy of a table, for presenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub id: TableId,
    pub name: String,
    pub orders: Vec<OrderSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_emits_once_per_effective_change() {
        let table = Table::new("T1");
        let changes = table.changes().listen();

        table.set_name("T1");
        table.set_name("Patio");

        let events = changes.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "table.name");
        assert_eq!(table.name(), "Patio");
        assert!(table.same_entity(&table.clone()));
        assert!(!table.same_entity(&Table::new("Patio")));
    }

    #[test]
    fn has_name_ignores_case() {
        let table = Table::new("Window 1");
        assert!(table.has_name("WINDOW 1"));
        assert!(!table.has_name("Window 2"));
    }

    #[test]
    fn orders_are_tracked_in_order() {
        let table = Table::new("T1");
        let first = Order::new();
        let second = Order::new();

        table.push_order(first.clone());
        table.push_order(second.clone());

        assert_eq!(table.first_order(), Some(first.clone()));
        assert_eq!(table.orders(), vec![first.clone(), second]);

        assert!(table.remove_order(&first));
        assert!(!table.remove_order(&first));
        assert_eq!(table.order_count(), 1);
    }

    #[test]
    fn snapshot_includes_order_totals() {
        let table = Table::new("T1");
        table.push_order(Order::new());

        let snapshot = table.snapshot();
        assert_eq!(snapshot.name, "T1");
        assert_eq!(snapshot.orders.len(), 1);
        assert!(snapshot.orders[0].items.is_empty());
    }
}
