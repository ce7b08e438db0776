//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Lowercase noun used in messages (`"supplier"`, `"product"`, ...).
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// Builds the `NotFound` error for an entity kind + id pair.
pub fn not_found<E: Entity>(id: E::Id) -> crate::DomainError {
    crate::DomainError::not_found(format!("{} {}", E::KIND, id))
}
