//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two values with the same attributes are
/// equal. Catalog products are value objects; tables, orders and order items are
/// entities (see [`crate::Entity`]).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct Product { id: i64, name: String, price: Decimal }
///
/// impl ValueObject for Product {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
