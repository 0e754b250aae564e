//! Core traits shared by the persistence layers.

use crate::SqlId;

/// A persistent object with a unique identifier.
///
/// This is the only knowledge the generic DAO layer needs about a domain
/// type beyond its table mapping.
pub trait Entity {
    /// The identifier type (primary key).
    type Id: SqlId;

    /// Returns the entity's unique identifier.
    fn id(&self) -> &Self::Id;
}
