//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Dining entities are shared handles; two handles denote the same entity when
/// their identifiers are equal, regardless of their current field values.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// Identity comparison.
    fn same_entity(&self, other: &Self) -> bool
    where
        Self: Sized,
    {
        self.id() == other.id()
    }
}
