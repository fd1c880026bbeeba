//! Product catalog: the read-only source of products a waiter can add to an
//! order.
//!
//! The workspace treats the catalog as an opaque [`CatalogSource`]. The only
//! concrete source shipped here reads a JSON file ([`JsonCatalog`]).

pub mod json;
pub mod product;
pub mod source;
pub mod view;

pub use json::{JsonCatalog, parse_products};
pub use product::Product;
pub use source::{CatalogError, CatalogSource, StaticCatalog};
pub use view::{ProductFilter, ProductsView};
