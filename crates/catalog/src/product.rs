use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tableside_core::ValueObject;

/// Product DTO as loaded from the catalog.
///
/// `id == 0` is reserved for "not from the catalog" on order lines, so catalog
/// products are expected to carry non-zero ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

impl Product {
    pub fn new(id: i64, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }
}

impl ValueObject for Product {}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({:.2})", self.name, self.price)
    }
}
