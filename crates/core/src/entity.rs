//! Entity trait: identity + continuity across status changes.

/// Entity marker + minimal interface.
///
/// Every portal record (certificate, grievance, tax record, announcement) is an
/// entity: its status changes over time while its id stays fixed.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
