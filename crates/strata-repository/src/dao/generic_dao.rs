//! GenericDao trait: CRUD access for any mapped entity.
//!
//! Concrete DAOs get find/save/update/delete for free by wrapping or
//! delegating to a `GenericDao<E>`, and add their own finders next to it.

use crate::entity::TableEntity;
use crate::lazy::LazyRef;
use crate::session::Session;
use async_trait::async_trait;
use strata_core::{Interface, Page, PageRequest, SqlValue, StrataResult};

/// Data access object for entity type `E`.
///
/// Each operation runs in its own transaction unless stated otherwise.
#[async_trait]
pub trait GenericDao<E: TableEntity>: Interface + Send + Sync {
    /// Simple type name of the entity this DAO manages.
    fn entity_name(&self) -> &'static str;

    /// Finds an entity by primary key.
    async fn find_by_id(&self, id: &E::Id) -> StrataResult<Option<E>>;

    /// Returns every entity, ordered by primary key.
    async fn find_all(&self) -> StrataResult<Vec<E>>;

    /// Returns one page of entities, ordered by primary key.
    async fn find_page(&self, page: PageRequest) -> StrataResult<Page<E>>;

    /// Finds the single entity whose `column` equals `value`.
    ///
    /// Fails with `Validation` for an unmapped column and with
    /// `NonUniqueResult` when more than one row matches.
    async fn find_by_field(&self, column: &str, value: SqlValue) -> StrataResult<Option<E>>;

    /// Checks whether a row with this id exists.
    async fn exists(&self, id: &E::Id) -> StrataResult<bool>;

    /// Counts all rows.
    async fn count(&self) -> StrataResult<u64>;

    /// Inserts a new entity and returns its id.
    async fn save(&self, entity: &E) -> StrataResult<E::Id>;

    /// Updates an existing entity. Fails with `NotFound` if there is no row.
    async fn update(&self, entity: &E) -> StrataResult<()>;

    /// Inserts or updates, depending on whether the id is already stored.
    async fn save_or_update(&self, entity: &E) -> StrataResult<()>;

    /// Inserts or updates every entity in one transaction.
    async fn save_or_update_all(&self, entities: &[E]) -> StrataResult<u64>;

    /// Copies the state of `entity` onto the stored row (inserting it if
    /// needed) and returns the stored state.
    async fn merge(&self, entity: &E) -> StrataResult<E>;

    /// Overwrites `entity` with the stored state.
    async fn refresh(&self, entity: &mut E) -> StrataResult<()>;

    /// Deletes the given entity. Returns `true` if a row was removed.
    async fn delete(&self, entity: &E) -> StrataResult<bool> {
        self.delete_by_id(entity.id()).await
    }

    /// Deletes by id. Returns `true` if a row was removed.
    async fn delete_by_id(&self, id: &E::Id) -> StrataResult<bool>;

    /// Deletes every row. Returns the number removed.
    async fn delete_all(&self) -> StrataResult<u64>;

    /// Deletes every given entity in one transaction. Returns the number removed.
    async fn delete_all_entities(&self, entities: &[E]) -> StrataResult<u64>;

    /// Loads an unloaded reference within the caller's session.
    ///
    /// Already loaded references are left untouched.
    async fn initialize(&self, session: &mut Session, reference: &mut LazyRef<E>) -> StrataResult<()>;
}
