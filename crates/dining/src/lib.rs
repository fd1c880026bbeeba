//! Dining entities: tables, their orders, and order lines.
//!
//! Entities are shared handles (cloning a handle never copies the entity) that
//! publish their changes through `tableside_events::Signal`s. Derived values
//! (line total, order total) are kept current by the entities themselves:
//! an [`Order`] subscribes to each of its items and refreshes its total when a
//! line's price or quantity moves.

pub mod order;
pub mod order_item;
pub mod table;

pub use order::{Order, OrderChange, OrderProperty, OrderSnapshot};
pub use order_item::{
    MIN_QUANTITY, NewOrderItem, OrderItem, OrderItemChanged, OrderItemProperty,
    OrderItemSnapshot,
};
pub use table::{Table, TableChange, TableProperty, TableSnapshot};
