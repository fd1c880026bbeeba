//! Lazy, filtered view over the loaded products.

use crate::Product;

/// Search predicate for the product picker.
///
/// Empty search text accepts everything; otherwise a product matches when its
/// name contains the search text, ignoring case (Unicode lowercase folding).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    search_text: String,
    needle: String,
}

impl ProductFilter {
    pub fn new(search_text: impl Into<String>) -> Self {
        let search_text = search_text.into();
        let needle = search_text.to_lowercase();
        Self {
            search_text,
            needle,
        }
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.needle.is_empty() || product.name.to_lowercase().contains(&self.needle)
    }

    pub fn view<'a>(&'a self, products: &'a [Product]) -> ProductsView<'a> {
        ProductsView {
            products,
            filter: self,
        }
    }
}

/// Products accepted by a [`ProductFilter`], evaluated on every iteration.
#[derive(Debug, Clone, Copy)]
pub struct ProductsView<'a> {
    products: &'a [Product],
    filter: &'a ProductFilter,
}

impl<'a> ProductsView<'a> {
    pub fn iter(self) -> impl Iterator<Item = &'a Product> + 'a {
        let filter = self.filter;
        self.products.iter().filter(move |p| filter.matches(p))
    }

    pub fn first(self) -> Option<&'a Product> {
        self.iter().next()
    }

    pub fn count(self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(self) -> bool {
        self.first().is_none()
    }
}

impl<'a> IntoIterator for ProductsView<'a> {
    type Item = &'a Product;
    type IntoIter = Box<dyn Iterator<Item = &'a Product> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
