//! `SqlGenericDao`, the [`GenericDao`] implementation over a SQLx `Any` pool.
//!
//! All SQL is rendered once, when the DAO is built, from the entity's
//! [`TableEntity`] mapping. Statement helpers take a plain connection so the
//! same code serves both pool-level calls (own transaction or pooled
//! connection) and the `_in` variants that run inside a caller's [`Session`].
//!
//! [`GenericDao`]: crate::dao::GenericDao

use crate::dao::GenericDao;
use crate::entity::TableEntity;
use crate::lazy::LazyRef;
use crate::metadata::EntityMetadata;
use crate::pool::DatabasePoolInterface;
use crate::session::Session;
use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, FromRow, Row};
use std::sync::Arc;
use strata_core::{Page, PageRequest, SqlId, SqlValue, StrataError, StrataResult};
use tracing::debug;

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

fn bind_value(query: AnyQuery<'_>, value: SqlValue) -> AnyQuery<'_> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Float(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Bytes(v) => query.bind(v),
    }
}

fn bind_all<I>(query: AnyQuery<'_>, values: I) -> AnyQuery<'_>
where
    I: IntoIterator<Item = SqlValue>,
{
    values.into_iter().fold(query, bind_value)
}

fn to_count(value: i64) -> StrataResult<u64> {
    u64::try_from(value).map_err(|_| StrataError::internal(format!("Negative row count: {}", value)))
}

/// SQL implementation of [`GenericDao`] for entity type `E`.
pub struct SqlGenericDao<E: TableEntity> {
    pool: Arc<dyn DatabasePoolInterface>,
    metadata: EntityMetadata<E>,
}

impl<E: TableEntity> SqlGenericDao<E> {
    /// Creates a DAO for `E`, reading its mapping and rendering its SQL for
    /// the pool's dialect.
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> StrataResult<Self> {
        let metadata = EntityMetadata::<E>::new(pool.dialect())?;
        debug!(
            entity = metadata.entity_name(),
            table = metadata.table(),
            dialect = %metadata.dialect(),
            "DAO created"
        );
        Ok(Self { pool, metadata })
    }

    /// Mapping and statements recovered for `E`.
    #[must_use]
    pub fn metadata(&self) -> &EntityMetadata<E> {
        &self.metadata
    }

    /// The pool this DAO runs on.
    #[must_use]
    pub fn pool(&self) -> &Arc<dyn DatabasePoolInterface> {
        &self.pool
    }

    // =========================================================================
    // Session-scoped operations
    // =========================================================================

    /// [`GenericDao::find_by_id`] inside `session`.
    pub async fn find_by_id_in(&self, session: &mut Session, id: &E::Id) -> StrataResult<Option<E>> {
        self.check_session(session)?;
        self.fetch_by_id(session.connection(), id).await
    }

    /// [`GenericDao::save`] inside `session`.
    pub async fn save_in(&self, session: &mut Session, entity: &E) -> StrataResult<E::Id> {
        self.check_session(session)?;
        debug!("{}: save {}", self.metadata.entity_name(), entity.id());

        let values = self.row_values(entity)?;
        bind_all(sqlx::query(&self.metadata.statements().insert), values)
            .execute(session.connection())
            .await?;

        Ok(entity.id().clone())
    }

    /// [`GenericDao::update`] inside `session`.
    pub async fn update_in(&self, session: &mut Session, entity: &E) -> StrataResult<()> {
        self.check_session(session)?;
        debug!("{}: update {}", self.metadata.entity_name(), entity.id());

        let mut values = self.column_values(entity)?;
        values.push(entity.id().to_sql_value());

        let result = bind_all(sqlx::query(&self.metadata.statements().update), values)
            .execute(session.connection())
            .await?;

        // MySQL reports 0 affected rows when nothing changed
        if result.rows_affected() == 0 && !self.exists_on(session.connection(), entity.id()).await? {
            return Err(StrataError::not_found(self.metadata.entity_name(), entity.id()));
        }

        Ok(())
    }

    /// [`GenericDao::save_or_update`] inside `session`.
    ///
    /// Decides on the id alone: an existing row is updated, otherwise a new
    /// one is inserted. A collision on any other unique column is a
    /// `Conflict` on every backend.
    pub async fn save_or_update_in(&self, session: &mut Session, entity: &E) -> StrataResult<()> {
        self.check_session(session)?;
        debug!("{}: save_or_update {}", self.metadata.entity_name(), entity.id());

        if self.exists_on(session.connection(), entity.id()).await? {
            self.update_in(session, entity).await
        } else {
            self.save_in(session, entity).await.map(|_| ())
        }
    }

    /// [`GenericDao::merge`] inside `session`.
    pub async fn merge_in(&self, session: &mut Session, entity: &E) -> StrataResult<E> {
        self.save_or_update_in(session, entity).await?;
        self.fetch_by_id(session.connection(), entity.id())
            .await?
            .ok_or_else(|| {
                StrataError::internal(format!(
                    "Failed to fetch merged {} {}",
                    self.metadata.entity_name(),
                    entity.id()
                ))
            })
    }

    /// [`GenericDao::refresh`] inside `session`.
    pub async fn refresh_in(&self, session: &mut Session, entity: &mut E) -> StrataResult<()> {
        self.check_session(session)?;
        let fresh = self.fetch_by_id(session.connection(), entity.id()).await?;
        self.replace_or_not_found(entity, fresh)
    }

    /// [`GenericDao::delete_by_id`] inside `session`.
    pub async fn delete_by_id_in(&self, session: &mut Session, id: &E::Id) -> StrataResult<bool> {
        self.check_session(session)?;
        Ok(self.remove_by_id(session.connection(), id).await? > 0)
    }

    /// [`GenericDao::delete`] inside `session`.
    pub async fn delete_in(&self, session: &mut Session, entity: &E) -> StrataResult<bool> {
        self.delete_by_id_in(session, entity.id()).await
    }

    // =========================================================================
    // Statement helpers
    // =========================================================================

    fn check_session(&self, session: &Session) -> StrataResult<()> {
        if session.dialect() == self.metadata.dialect() {
            Ok(())
        } else {
            Err(StrataError::Configuration(format!(
                "{} DAO is bound to {} but the session is {}",
                self.metadata.entity_name(),
                self.metadata.dialect(),
                session.dialect()
            )))
        }
    }

    fn column_values(&self, entity: &E) -> StrataResult<Vec<SqlValue>> {
        let values = entity.values();
        if values.len() != E::COLUMNS.len() {
            return Err(StrataError::internal(format!(
                "{} returned {} values for {} columns",
                self.metadata.entity_name(),
                values.len(),
                E::COLUMNS.len()
            )));
        }
        Ok(values)
    }

    /// Id followed by the column values, matching the insert column list.
    fn row_values(&self, entity: &E) -> StrataResult<Vec<SqlValue>> {
        let mut values = Vec::with_capacity(E::COLUMNS.len() + 1);
        values.push(entity.id().to_sql_value());
        values.extend(self.column_values(entity)?);
        Ok(values)
    }

    fn decode(row: &AnyRow) -> StrataResult<E> {
        let raw = <E::Row as FromRow<'_, AnyRow>>::from_row(row)?;
        E::from_row(raw)
    }

    fn replace_or_not_found(&self, entity: &mut E, fresh: Option<E>) -> StrataResult<()> {
        match fresh {
            Some(fresh) => {
                *entity = fresh;
                Ok(())
            }
            None => Err(StrataError::not_found(self.metadata.entity_name(), entity.id())),
        }
    }

    async fn fetch_by_id(&self, conn: &mut AnyConnection, id: &E::Id) -> StrataResult<Option<E>> {
        debug!("{}: find_by_id {}", self.metadata.entity_name(), id);

        let row = bind_all(
            sqlx::query(&self.metadata.statements().select_by_id),
            [id.to_sql_value()],
        )
        .fetch_optional(conn)
        .await?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn exists_on(&self, conn: &mut AnyConnection, id: &E::Id) -> StrataResult<bool> {
        let row = bind_all(sqlx::query(&self.metadata.statements().exists), [id.to_sql_value()])
            .fetch_one(conn)
            .await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    async fn remove_by_id(&self, conn: &mut AnyConnection, id: &E::Id) -> StrataResult<u64> {
        debug!("{}: delete {}", self.metadata.entity_name(), id);

        let result = bind_all(
            sqlx::query(&self.metadata.statements().delete_by_id),
            [id.to_sql_value()],
        )
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl<E: TableEntity> GenericDao<E> for SqlGenericDao<E> {
    fn entity_name(&self) -> &'static str {
        self.metadata.entity_name()
    }

    async fn find_by_id(&self, id: &E::Id) -> StrataResult<Option<E>> {
        let mut conn = self.pool.inner().acquire().await?;
        self.fetch_by_id(&mut conn, id).await
    }

    async fn find_all(&self) -> StrataResult<Vec<E>> {
        debug!("{}: find_all", self.entity_name());

        let rows = sqlx::query(&self.metadata.statements().select_all)
            .fetch_all(self.pool.inner())
            .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn find_page(&self, page: PageRequest) -> StrataResult<Page<E>> {
        debug!("{}: find_page page={} size={}", self.entity_name(), page.page, page.size);

        let mut conn = self.pool.inner().acquire().await?;

        let total: i64 = sqlx::query_scalar(&self.metadata.statements().count)
            .fetch_one(&mut *conn)
            .await?;

        let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let rows = sqlx::query(&self.metadata.statements().select_page)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await?;

        let content = rows.iter().map(Self::decode).collect::<StrataResult<Vec<_>>>()?;
        Ok(Page::new(content, page, to_count(total)?))
    }

    async fn find_by_field(&self, column: &str, value: SqlValue) -> StrataResult<Option<E>> {
        debug!("{}: find_by_field {} = {}", self.entity_name(), column, value);

        let sql = self.metadata.select_by_column(column)?;
        let rows = bind_value(sqlx::query(&sql), value)
            .fetch_all(self.pool.inner())
            .await?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => Self::decode(row).map(Some),
            _ => Err(StrataError::NonUniqueResult {
                entity: self.entity_name(),
                field: column.to_string(),
                count: rows.len(),
            }),
        }
    }

    async fn exists(&self, id: &E::Id) -> StrataResult<bool> {
        let mut conn = self.pool.inner().acquire().await?;
        self.exists_on(&mut conn, id).await
    }

    async fn count(&self) -> StrataResult<u64> {
        let count: i64 = sqlx::query_scalar(&self.metadata.statements().count)
            .fetch_one(self.pool.inner())
            .await?;
        to_count(count)
    }

    async fn save(&self, entity: &E) -> StrataResult<E::Id> {
        let mut session = self.pool.begin().await?;
        let id = self.save_in(&mut session, entity).await?;
        session.commit().await?;
        Ok(id)
    }

    async fn update(&self, entity: &E) -> StrataResult<()> {
        let mut session = self.pool.begin().await?;
        self.update_in(&mut session, entity).await?;
        session.commit().await
    }

    async fn save_or_update(&self, entity: &E) -> StrataResult<()> {
        let mut session = self.pool.begin().await?;
        self.save_or_update_in(&mut session, entity).await?;
        session.commit().await
    }

    async fn save_or_update_all(&self, entities: &[E]) -> StrataResult<u64> {
        debug!("{}: save_or_update_all ({} entities)", self.entity_name(), entities.len());

        let mut session = self.pool.begin().await?;
        for entity in entities {
            self.save_or_update_in(&mut session, entity).await?;
        }
        session.commit().await?;

        Ok(entities.len() as u64)
    }

    async fn merge(&self, entity: &E) -> StrataResult<E> {
        let mut session = self.pool.begin().await?;
        let merged = self.merge_in(&mut session, entity).await?;
        session.commit().await?;
        Ok(merged)
    }

    async fn refresh(&self, entity: &mut E) -> StrataResult<()> {
        let fresh = {
            let mut conn = self.pool.inner().acquire().await?;
            self.fetch_by_id(&mut conn, entity.id()).await?
        };
        self.replace_or_not_found(entity, fresh)
    }

    async fn delete_by_id(&self, id: &E::Id) -> StrataResult<bool> {
        let mut session = self.pool.begin().await?;
        let deleted = self.delete_by_id_in(&mut session, id).await?;
        session.commit().await?;
        Ok(deleted)
    }

    async fn delete_all(&self) -> StrataResult<u64> {
        debug!("{}: delete_all", self.entity_name());

        let result = sqlx::query(&self.metadata.statements().delete_all)
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_entities(&self, entities: &[E]) -> StrataResult<u64> {
        debug!("{}: delete_all_entities ({} entities)", self.entity_name(), entities.len());

        let mut session = self.pool.begin().await?;
        let mut removed = 0;
        for entity in entities {
            removed += self.remove_by_id(session.connection(), entity.id()).await?;
        }
        session.commit().await?;

        Ok(removed)
    }

    async fn initialize(&self, session: &mut Session, reference: &mut LazyRef<E>) -> StrataResult<()> {
        let LazyRef::Unloaded(id) = reference else {
            return Ok(());
        };

        self.check_session(session)?;
        let entity = self
            .fetch_by_id(session.connection(), id)
            .await?
            .ok_or_else(|| StrataError::not_found(self.entity_name(), &*id))?;

        *reference = LazyRef::Loaded(entity);
        Ok(())
    }
}

impl<E: TableEntity> std::fmt::Debug for SqlGenericDao<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlGenericDao")
            .field("entity", &self.metadata.entity_name())
            .field("table", &self.metadata.table())
            .finish_non_exhaustive()
    }
}
