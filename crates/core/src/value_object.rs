//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity of their own - two instances with the same
/// attribute values are the same value. They are immutable by convention: to
/// "change" one, build a new one.
///
/// Contrast with [`crate::Entity`], where identity persists across state
/// changes.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
