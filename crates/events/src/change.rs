//! Event shapes shared by every observable entity.

use crate::Event;

/// A named, observable field of an entity.
///
/// Implemented by small `Copy` enums (`OrderItemProperty::Price`, ...).
pub trait Property: Copy + Eq + core::fmt::Debug + 'static {
    /// Stable identifier used for logging and `Event::event_type`.
    fn event_type(&self) -> &'static str;
}

/// `source` changed the value of `property`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChanged<S, P> {
    pub source: S,
    pub property: P,
}

impl<S, P> PropertyChanged<S, P> {
    pub fn new(source: S, property: P) -> Self {
        Self { source, property }
    }
}

impl<S, P> Event for PropertyChanged<S, P>
where
    S: Clone + core::fmt::Debug + 'static,
    P: Property,
{
    fn event_type(&self) -> &'static str {
        self.property.event_type()
    }
}

/// Structural change of an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange<T> {
    /// `item` now lives at `index`.
    Added { index: usize, item: T },
    /// `item` was removed from `index`.
    Removed { index: usize, item: T },
    /// Contents replaced wholesale.
    Reset,
}

impl<T> Event for CollectionChange<T>
where
    T: Clone + core::fmt::Debug + 'static,
{
    fn event_type(&self) -> &'static str {
        match self {
            CollectionChange::Added { .. } => "collection.added",
            CollectionChange::Removed { .. } => "collection.removed",
            CollectionChange::Reset => "collection.reset",
        }
    }
}
