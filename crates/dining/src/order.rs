use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rust_decimal::Decimal;
use serde::Serialize;

use tableside_core::{Entity, OrderId};
use tableside_events::{CollectionChange, Event, Property, PropertyChanged, Signal, SubscriptionHandle};

use crate::order_item::{OrderItem, OrderItemChanged, OrderItemProperty, OrderItemSnapshot};

/// Observable fields of an [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderProperty {
    /// Derived: sum of the line totals.
    Total,
}

impl Property for OrderProperty {
    fn event_type(&self) -> &'static str {
        match self {
            OrderProperty::Total => "order.total",
        }
    }
}

/// Change published by an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderChange {
    Property(PropertyChanged<OrderId, OrderProperty>),
    Items(CollectionChange<OrderItem>),
}

impl Event for OrderChange {
    fn event_type(&self) -> &'static str {
        match self {
            OrderChange::Property(e) => e.event_type(),
            OrderChange::Items(CollectionChange::Added { .. }) => "order.item_added",
            OrderChange::Items(CollectionChange::Removed { .. }) => "order.item_removed",
            OrderChange::Items(CollectionChange::Reset) => "order.items_reset",
        }
    }
}

struct Line {
    item: OrderItem,
    subscription: SubscriptionHandle,
}

struct Inner {
    id: OrderId,
    lines: RefCell<Vec<Line>>,
    total: Cell<Decimal>,
    changes: Signal<OrderChange>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for line in self.lines.get_mut().drain(..) {
            line.item.changes().unsubscribe(line.subscription);
        }
    }
}

/// An ordered list of line items with a derived total.
///
/// The order holds one subscription per owned item and refreshes `total()`
/// whenever an item's price, quantity or total changes, or when items are
/// added or removed. A `Total` change is published only when the value
/// actually moves. Removed items are unsubscribed and no longer affect the
/// order.
#[derive(Clone)]
pub struct Order {
    inner: Rc<Inner>,
}

impl Order {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                id: OrderId::new(),
                lines: RefCell::new(Vec::new()),
                total: Cell::new(Decimal::ZERO),
                changes: Signal::new(),
            }),
        }
    }

    pub fn total(&self) -> Decimal {
        self.inner.total.get()
    }

    pub fn changes(&self) -> &Signal<OrderChange> {
        &self.inner.changes
    }

    /// Items in insertion order.
    pub fn items(&self) -> Vec<OrderItem> {
        self.inner
            .lines
            .borrow()
            .iter()
            .map(|line| line.item.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lines.borrow().is_empty()
    }

    pub fn contains(&self, item: &OrderItem) -> bool {
        self.position(item).is_some()
    }

    pub fn position(&self, item: &OrderItem) -> Option<usize> {
        self.inner
            .lines
            .borrow()
            .iter()
            .position(|line| line.item == *item)
    }

    /// First item (in insertion order) accepted by `predicate`.
    pub fn find(&self, mut predicate: impl FnMut(&OrderItem) -> bool) -> Option<OrderItem> {
        self.inner
            .lines
            .borrow()
            .iter()
            .find(|line| predicate(&line.item))
            .map(|line| line.item.clone())
    }

    /// Append `item`. Returns `false` (and does nothing) if it is already here.
    pub fn push(&self, item: OrderItem) -> bool {
        if self.contains(&item) {
            return false;
        }

        let weak = Rc::downgrade(&self.inner);
        let subscription = item.changes().subscribe(move |change: &OrderItemChanged| {
            if affects_total(change.property) {
                if let Some(order) = upgrade(&weak) {
                    order.refresh_total();
                }
            }
        });

        let index = {
            let mut lines = self.inner.lines.borrow_mut();
            lines.push(Line {
                item: item.clone(),
                subscription,
            });
            lines.len() - 1
        };

        self.inner
            .changes
            .emit(&OrderChange::Items(CollectionChange::Added { index, item }));
        self.refresh_total();
        true
    }

    /// Remove `item`. Returns `false` if it is not part of this order.
    pub fn remove(&self, item: &OrderItem) -> bool {
        let removed = {
            let mut lines = self.inner.lines.borrow_mut();
            lines
                .iter()
                .position(|line| line.item == *item)
                .map(|index| (index, lines.remove(index)))
        };

        let Some((index, line)) = removed else {
            return false;
        };

        line.item.changes().unsubscribe(line.subscription);
        self.inner.changes.emit(&OrderChange::Items(CollectionChange::Removed {
            index,
            item: line.item,
        }));
        self.refresh_total();
        true
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.inner.id,
            items: self.items().iter().map(OrderItem::snapshot).collect(),
            total: self.total(),
        }
    }

    /// Recompute the total from scratch; publish only on change. Saturates at
    /// the `Decimal` range.
    fn refresh_total(&self) {
        let total = self
            .inner
            .lines
            .borrow()
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.item.total()));

        if total == self.inner.total.get() {
            return;
        }
        self.inner.total.set(total);
        tracing::trace!(order = %self.inner.id, %total, "order total refreshed");

        self.inner.changes.emit(&OrderChange::Property(PropertyChanged::new(
            self.inner.id,
            OrderProperty::Total,
        )));
    }
}

fn affects_total(property: OrderItemProperty) -> bool {
    matches!(
        property,
        OrderItemProperty::Price | OrderItemProperty::Quantity | OrderItemProperty::Total
    )
}

fn upgrade(weak: &Weak<Inner>) -> Option<Order> {
    weak.upgrade().map(|inner| Order { inner })
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> Self::Id {
        self.inner.id
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Order {}

impl core::fmt::Debug for Order {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.inner.id)
            .field("items", &self.len())
            .field("total", &self.total())
            .finish()
    }
}

/// Point-in-time copy of an order, for presenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub items: Vec<OrderItemSnapshot>,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order_item::NewOrderItem;
    use proptest::prelude::*;

    fn line(product_id: i64, name: &str, cents: i64, quantity: i32) -> OrderItem {
        OrderItem::new(NewOrderItem {
            product_id,
            name: name.to_string(),
            price: Decimal::new(cents, 2),
            quantity,
        })
    }

    fn total_events(events: &[OrderChange]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, OrderChange::Property(p) if p.property == OrderProperty::Total))
            .count()
    }

    fn expected_total(order: &Order) -> Decimal {
        order
            .items()
            .iter()
            .map(|i| i.price() * Decimal::from(i.quantity()))
            .sum()
    }

    #[test]
    fn new_order_is_empty_with_zero_total() {
        let order = Order::new();
        assert!(order.is_empty());
        assert_eq!(order.total(), Decimal::ZERO);
    }

    #[test]
    fn push_keeps_insertion_order_and_sums_totals() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 2);
        let pie = line(2, "Pie", 400, 1);

        assert!(order.push(tea.clone()));
        assert!(order.push(pie.clone()));

        assert_eq!(order.items(), vec![tea, pie]);
        assert_eq!(order.total(), Decimal::new(900, 2));
    }

    #[test]
    fn push_emits_added_then_total() {
        let order = Order::new();
        let changes = order.changes().listen();
        let tea = line(1, "Tea", 250, 1);

        order.push(tea.clone());

        let events = changes.drain();
        assert_eq!(
            events[0],
            OrderChange::Items(CollectionChange::Added { index: 0, item: tea })
        );
        assert_eq!(total_events(&events), 1);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn pushing_same_item_twice_is_noop() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 1);

        assert!(order.push(tea.clone()));
        assert!(!order.push(tea.clone()));
        assert_eq!(order.len(), 1);
        assert_eq!(tea.changes().subscriber_count(), 1);
    }

    #[test]
    fn item_price_change_refreshes_total_once() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 2);
        order.push(tea.clone());
        let changes = order.changes().listen();

        tea.set_price(Decimal::new(300, 2));

        assert_eq!(order.total(), Decimal::new(600, 2));
        assert_eq!(total_events(&changes.drain()), 1);
    }

    #[test]
    fn item_name_change_does_not_touch_total() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 2);
        order.push(tea.clone());
        let changes = order.changes().listen();

        tea.set_name("Green Tea");

        assert!(changes.drain().is_empty());
    }

    #[test]
    fn zero_priced_item_does_not_emit_total() {
        let order = Order::new();
        let changes = order.changes().listen();

        order.push(line(0, "Water", 0, 1));

        assert_eq!(total_events(&changes.drain()), 0);
    }

    #[test]
    fn removed_item_no_longer_affects_total() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 2);
        let pie = line(2, "Pie", 400, 1);
        order.push(tea.clone());
        order.push(pie.clone());

        assert!(order.remove(&tea));
        assert_eq!(order.total(), Decimal::new(400, 2));
        assert_eq!(tea.changes().subscriber_count(), 0);

        let changes = order.changes().listen();
        tea.set_quantity(10);
        tea.set_price(Decimal::new(999, 2));

        assert_eq!(order.total(), Decimal::new(400, 2));
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn double_remove_is_noop() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 1);
        order.push(tea.clone());

        assert!(order.remove(&tea));
        let changes = order.changes().listen();
        assert!(!order.remove(&tea));
        assert!(changes.drain().is_empty());
    }

    #[test]
    fn remove_reports_index() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 1);
        let pie = line(2, "Pie", 400, 1);
        order.push(tea.clone());
        order.push(pie.clone());
        let changes = order.changes().listen();

        order.remove(&pie);

        assert_eq!(
            changes.drain()[0],
            OrderChange::Items(CollectionChange::Removed { index: 1, item: pie })
        );
    }

    #[test]
    fn dropping_order_detaches_from_items() {
        let tea = line(1, "Tea", 250, 1);
        {
            let order = Order::new();
            order.push(tea.clone());
            assert_eq!(tea.changes().subscriber_count(), 1);
        }
        assert_eq!(tea.changes().subscriber_count(), 0);
        tea.set_quantity(2);
    }

    #[test]
    fn find_returns_first_match() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 1);
        order.push(tea.clone());
        order.push(line(1, "Tea again", 250, 1));

        assert_eq!(order.find(|i| i.product_id() == 1), Some(tea));
        assert!(order.find(|i| i.product_id() == 9).is_none());
    }

    #[test]
    fn observer_may_mutate_order_reentrantly() {
        let order = Order::new();
        let tea = line(1, "Tea", 250, 1);
        order.push(tea.clone());

        let handle = order.clone();
        let extra = line(0, "Bread", 100, 1);
        let pending = std::cell::RefCell::new(Some(extra.clone()));
        order.changes().subscribe(move |change| {
            if matches!(change, OrderChange::Property(_)) {
                let next = pending.borrow_mut().take();
                if let Some(item) = next {
                    handle.push(item);
                }
            }
        });

        tea.set_quantity(2);

        assert!(order.contains(&extra));
        assert_eq!(order.total(), Decimal::new(600, 2));
    }

    #[test]
    fn total_saturates_on_huge_lines() {
        let order = Order::new();
        let huge = Decimal::MAX / Decimal::TWO + Decimal::ONE;
        for id in 1..=2 {
            order.push(OrderItem::new(NewOrderItem {
                product_id: id,
                name: "Caviar".to_string(),
                price: huge,
                quantity: 1,
            }));
        }

        assert_eq!(order.len(), 2);
        assert_eq!(order.total(), Decimal::MAX);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: after any interleaving of pushes, removals and line edits,
        /// the order total equals the sum of price × quantity of its items.
        #[test]
        fn total_law_holds_after_every_step(
            ops in prop::collection::vec((0u8..4, 0usize..6, 0i64..10_000, -3i32..20), 1..40)
        ) {
            let order = Order::new();
            let mut detached: Vec<OrderItem> = Vec::new();

            for (op, pick, cents, qty) in ops {
                let items = order.items();
                match op {
                    0 => {
                        order.push(line(pick as i64, "x", cents, qty));
                    }
                    1 if !items.is_empty() => {
                        let victim = items[pick % items.len()].clone();
                        order.remove(&victim);
                        detached.push(victim);
                    }
                    2 if !items.is_empty() => {
                        items[pick % items.len()].set_price(Decimal::new(cents, 2));
                    }
                    3 if !items.is_empty() => {
                        items[pick % items.len()].set_quantity(qty);
                    }
                    _ => {
                        if let Some(gone) = detached.last() {
                            gone.set_quantity(qty.saturating_add(7));
                        }
                    }
                }

                prop_assert_eq!(order.total(), expected_total(&order));
            }
        }
    }
}
