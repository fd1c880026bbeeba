use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use serde::Serialize;

use tableside_core::{DomainError, DomainResult, Entity, OrderItemId};
use tableside_events::{Property, PropertyChanged, Signal};

/// Smallest quantity an order line can carry; lower writes are clamped.
pub const MIN_QUANTITY: i32 = 1;

/// Observable fields of an [`OrderItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderItemProperty {
    Name,
    ProductId,
    Price,
    Quantity,
    /// Derived: `price × quantity`.
    Total,
}

impl Property for OrderItemProperty {
    fn event_type(&self) -> &'static str {
        match self {
            OrderItemProperty::Name => "order_item.name",
            OrderItemProperty::ProductId => "order_item.product_id",
            OrderItemProperty::Price => "order_item.price",
            OrderItemProperty::Quantity => "order_item.quantity",
            OrderItemProperty::Total => "order_item.total",
        }
    }
}

pub type OrderItemChanged = PropertyChanged<OrderItemId, OrderItemProperty>;

/// Construction input for [`OrderItem::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    /// Catalog product id; `0` means "not from the catalog".
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug)]
struct LineState {
    product_id: i64,
    name: String,
    price: Decimal,
    quantity: i32,
}

#[derive(Debug)]
struct Inner {
    id: OrderItemId,
    state: RefCell<LineState>,
    changes: Signal<OrderItemChanged>,
}

/// A priced, quantized order line.
///
/// Invariants:
/// - `quantity() >= MIN_QUANTITY` at all times (writes are clamped silently)
/// - `total() == price() * quantity()`
///
/// Every effective write emits one [`OrderItemChanged`] naming the field;
/// price and quantity writes are followed by a `Total` event. Writing the
/// current value emits nothing.
#[derive(Clone)]
pub struct OrderItem {
    inner: Rc<Inner>,
}

impl OrderItem {
    pub fn new(new: NewOrderItem) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: OrderItemId::new(),
                state: RefCell::new(LineState {
                    product_id: new.product_id,
                    name: new.name,
                    price: new.price,
                    quantity: new.quantity.max(MIN_QUANTITY),
                }),
                changes: Signal::new(),
            }),
        }
    }

    pub fn product_id(&self) -> i64 {
        self.inner.state.borrow().product_id
    }

    pub fn name(&self) -> String {
        self.inner.state.borrow().name.clone()
    }

    pub fn price(&self) -> Decimal {
        self.inner.state.borrow().price
    }

    pub fn quantity(&self) -> i32 {
        self.inner.state.borrow().quantity
    }

    /// `price × quantity`, saturating at the `Decimal` range.
    pub fn total(&self) -> Decimal {
        let state = self.inner.state.borrow();
        line_total(state.price, state.quantity)
    }

    pub fn changes(&self) -> &Signal<OrderItemChanged> {
        &self.inner.changes
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        if !self.write(|s| replace_if_changed(&mut s.name, name)) {
            return;
        }
        self.emit(OrderItemProperty::Name);
    }

    pub fn set_product_id(&self, product_id: i64) {
        if !self.write(|s| replace_if_changed(&mut s.product_id, product_id)) {
            return;
        }
        self.emit(OrderItemProperty::ProductId);
    }

    pub fn set_price(&self, price: Decimal) {
        if !self.write(|s| replace_if_changed(&mut s.price, price)) {
            return;
        }
        self.emit(OrderItemProperty::Price);
        self.emit(OrderItemProperty::Total);
    }

    /// Assign the quantity, clamped to at least [`MIN_QUANTITY`].
    pub fn set_quantity(&self, quantity: i32) {
        let quantity = quantity.max(MIN_QUANTITY);
        if !self.write(|s| replace_if_changed(&mut s.quantity, quantity)) {
            return;
        }
        self.emit(OrderItemProperty::Quantity);
        self.emit(OrderItemProperty::Total);
    }

    /// Add one to the quantity and return the new value.
    ///
    /// Fails without touching the line when the quantity or the resulting
    /// line total would leave its range.
    pub fn increment_quantity(&self) -> DomainResult<i32> {
        let (next, price) = {
            let state = self.inner.state.borrow();
            (state.quantity.checked_add(1), state.price)
        };
        let next = next
            .filter(|next| price.checked_mul(Decimal::from(*next)).is_some())
            .ok_or_else(|| {
                DomainError::validation(format!("quantity of \"{}\" overflows", self.name()))
            })?;
        self.set_quantity(next);
        Ok(self.quantity())
    }

    pub fn snapshot(&self) -> OrderItemSnapshot {
        let state = self.inner.state.borrow();
        OrderItemSnapshot {
            id: self.inner.id,
            product_id: state.product_id,
            name: state.name.clone(),
            price: state.price,
            quantity: state.quantity,
            total: line_total(state.price, state.quantity),
        }
    }

    /// Run `f` under a short mutable borrow; the borrow is released before any
    /// event goes out so handlers can read the item.
    fn write(&self, f: impl FnOnce(&mut LineState) -> bool) -> bool {
        f(&mut self.inner.state.borrow_mut())
    }

    fn emit(&self, property: OrderItemProperty) {
        self.inner
            .changes
            .emit(&PropertyChanged::new(self.inner.id, property));
    }
}

fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price.saturating_mul(Decimal::from(quantity))
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl Entity for OrderItem {
    type Id = OrderItemId;

    fn id(&self) -> Self::Id {
        self.inner.id
    }
}

impl PartialEq for OrderItem {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for OrderItem {}

impl core::fmt::Debug for OrderItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("OrderItem")
            .field("id", &self.inner.id)
            .field("product_id", &state.product_id)
            .field("name", &state.name)
            .field("price", &state.price)
            .field("quantity", &state.quantity)
            .finish()
    }
}

/// Point-in-time copy of an order line, for presenters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemSnapshot {
    pub id: OrderItemId,
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
}
