//! Lazily loaded entity references.

use strata_core::Entity;

/// A reference to an entity that may not have been loaded yet.
///
/// Holds either just the id or the full entity. A DAO resolves an unloaded
/// reference with `GenericDao::initialize`, inside the caller's session.
#[derive(Debug, Clone)]
pub enum LazyRef<E: Entity> {
    /// Only the id is known.
    Unloaded(E::Id),
    /// The entity has been loaded.
    Loaded(E),
}

impl<E: Entity> LazyRef<E> {
    /// Creates an unloaded reference.
    #[must_use]
    pub fn unloaded(id: E::Id) -> Self {
        Self::Unloaded(id)
    }

    /// Creates an already loaded reference.
    #[must_use]
    pub fn loaded(entity: E) -> Self {
        Self::Loaded(entity)
    }

    /// The referenced id, loaded or not.
    #[must_use]
    pub fn id(&self) -> &E::Id {
        match self {
            Self::Unloaded(id) => id,
            Self::Loaded(entity) => entity.id(),
        }
    }

    /// Returns true once the entity has been loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// The loaded entity, if any.
    #[must_use]
    pub fn get(&self) -> Option<&E> {
        match self {
            Self::Loaded(entity) => Some(entity),
            Self::Unloaded(_) => None,
        }
    }

    /// Consumes the reference, returning the entity if it was loaded.
    #[must_use]
    pub fn into_loaded(self) -> Option<E> {
        match self {
            Self::Loaded(entity) => Some(entity),
            Self::Unloaded(_) => None,
        }
    }
}

impl<E: Entity> From<E> for LazyRef<E> {
    fn from(entity: E) -> Self {
        Self::Loaded(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: i64,
        name: String,
    }

    impl Entity for Tag {
        type Id = i64;

        fn id(&self) -> &i64 {
            &self.id
        }
    }

    #[test]
    fn test_unloaded_reference() {
        let lazy: LazyRef<Tag> = LazyRef::unloaded(9);
        assert!(!lazy.is_loaded());
        assert_eq!(*lazy.id(), 9);
        assert!(lazy.get().is_none());
        assert!(lazy.into_loaded().is_none());
    }

    #[test]
    fn test_loaded_reference() {
        let tag = Tag {
            id: 3,
            name: "urgent".to_string(),
        };
        let lazy = LazyRef::from(tag.clone());
        assert!(lazy.is_loaded());
        assert_eq!(*lazy.id(), 3);
        assert_eq!(lazy.get().map(|t| t.name.as_str()), Some("urgent"));
        assert_eq!(lazy.into_loaded(), Some(tag));
    }
}
