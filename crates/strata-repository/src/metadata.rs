//! Entity metadata recovered from the type parameter of a DAO.
//!
//! Built once per DAO: the entity's simple type name, its table mapping and
//! every fixed SQL statement rendered for the pool's dialect.

use crate::entity::TableEntity;
use crate::pool::Dialect;
use std::collections::HashSet;
use std::marker::PhantomData;
use strata_core::{StrataError, StrataResult};

/// Pre-rendered statements for one entity type.
#[derive(Debug, Clone)]
pub struct Statements {
    pub select_by_id: String,
    pub select_all: String,
    pub select_page: String,
    pub count: String,
    pub exists: String,
    pub insert: String,
    pub update: String,
    pub delete_by_id: String,
    pub delete_all: String,
}

/// Mapping and SQL for entity type `E`.
pub struct EntityMetadata<E> {
    entity_name: &'static str,
    dialect: Dialect,
    select_list: String,
    statements: Statements,
    _entity: PhantomData<fn() -> E>,
}

impl<E: TableEntity> EntityMetadata<E> {
    /// Reads the mapping of `E` and renders its statements for `dialect`.
    pub fn new(dialect: Dialect) -> StrataResult<Self> {
        let entity_name = simple_type_name(std::any::type_name::<E>());
        validate_mapping(entity_name, E::TABLE, E::ID_COLUMN, E::COLUMNS)?;

        let select_list = std::iter::once(E::ID_COLUMN)
            .chain(E::COLUMNS.iter().copied())
            .collect::<Vec<_>>()
            .join(", ");
        let statements = render_statements(dialect, E::TABLE, E::ID_COLUMN, E::COLUMNS, &select_list);

        Ok(Self {
            entity_name,
            dialect,
            select_list,
            statements,
            _entity: PhantomData,
        })
    }

    /// Simple (unqualified) type name of the entity.
    #[must_use]
    pub fn entity_name(&self) -> &'static str {
        self.entity_name
    }

    /// Dialect the statements were rendered for.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &'static str {
        E::TABLE
    }

    /// Pre-rendered statements.
    #[must_use]
    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    /// Returns true if `column` is the id or one of the mapped columns.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        column == E::ID_COLUMN || E::COLUMNS.contains(&column)
    }

    /// `SELECT .. WHERE column = ?` for a mapped column.
    pub fn select_by_column(&self, column: &str) -> StrataResult<String> {
        if !self.has_column(column) {
            return Err(StrataError::validation(format!(
                "{} has no column named '{}'",
                self.entity_name, column
            )));
        }
        Ok(format!(
            "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
            self.select_list,
            E::TABLE,
            column,
            self.dialect.placeholder(1),
            E::ID_COLUMN
        ))
    }
}

impl<E> std::fmt::Debug for EntityMetadata<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("entity_name", &self.entity_name)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

/// `my_app::model::Customer` → `Customer`, `a::Wrapper<b::Inner>` → `Wrapper`.
pub(crate) fn simple_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_mapping(
    entity: &str,
    table: &str,
    id_column: &str,
    columns: &[&str],
) -> StrataResult<()> {
    let invalid = |what: String| {
        StrataError::Configuration(format!("Invalid table mapping for {}: {}", entity, what))
    };

    if !is_identifier(table) {
        return Err(invalid(format!("table name '{}' is not a plain identifier", table)));
    }
    if !is_identifier(id_column) {
        return Err(invalid(format!("id column '{}' is not a plain identifier", id_column)));
    }
    if columns.is_empty() {
        return Err(invalid("no columns besides the id".to_string()));
    }

    let mut seen = HashSet::new();
    for column in columns {
        if !is_identifier(column) {
            return Err(invalid(format!("column '{}' is not a plain identifier", column)));
        }
        if *column == id_column {
            return Err(invalid(format!("id column '{}' listed among COLUMNS", column)));
        }
        if !seen.insert(*column) {
            return Err(invalid(format!("column '{}' listed twice", column)));
        }
    }

    Ok(())
}

fn render_statements(
    dialect: Dialect,
    table: &str,
    id: &str,
    columns: &[&str],
    select_list: &str,
) -> Statements {
    let n = columns.len();
    let p = |i: usize| dialect.placeholder(i);

    let insert_values = (1..=n + 1).map(p).collect::<Vec<_>>().join(", ");
    let insert = format!("INSERT INTO {} ({}) VALUES ({})", table, select_list, insert_values);

    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", c, p(i + 1)))
        .collect::<Vec<_>>()
        .join(", ");

    Statements {
        select_by_id: format!("SELECT {} FROM {} WHERE {} = {}", select_list, table, id, p(1)),
        select_all: format!("SELECT {} FROM {} ORDER BY {}", select_list, table, id),
        select_page: format!(
            "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
            select_list,
            table,
            id,
            p(1),
            p(2)
        ),
        count: format!("SELECT COUNT(*) FROM {}", table),
        exists: format!("SELECT COUNT(*) FROM {} WHERE {} = {}", table, id, p(1)),
        insert,
        update: format!("UPDATE {} SET {} WHERE {} = {}", table, assignments, id, p(n + 1)),
        delete_by_id: format!("DELETE FROM {} WHERE {} = {}", table, id, p(1)),
        delete_all: format!("DELETE FROM {}", table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::FromRow;
    use strata_core::{Entity, SqlValue, StrataResult};

    #[derive(FromRow)]
    struct WidgetRow {
        id: i64,
        label: String,
        weight: f64,
    }

    struct Widget {
        id: i64,
        label: String,
        weight: f64,
    }

    impl Entity for Widget {
        type Id = i64;

        fn id(&self) -> &i64 {
            &self.id
        }
    }

    impl TableEntity for Widget {
        const TABLE: &'static str = "widgets";
        const COLUMNS: &'static [&'static str] = &["label", "weight"];
        type Row = WidgetRow;

        fn values(&self) -> Vec<SqlValue> {
            vec![self.label.clone().into(), self.weight.into()]
        }

        fn from_row(row: WidgetRow) -> StrataResult<Self> {
            Ok(Self {
                id: row.id,
                label: row.label,
                weight: row.weight,
            })
        }
    }

    #[test]
    fn test_entity_name_recovered_from_type() {
        let meta = EntityMetadata::<Widget>::new(Dialect::Sqlite).unwrap();
        assert_eq!(meta.entity_name(), "Widget");
        assert_eq!(meta.table(), "widgets");
    }

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("app::model::Customer"), "Customer");
        assert_eq!(simple_type_name("app::Wrapper<app::Inner>"), "Wrapper");
        assert_eq!(simple_type_name("Plain"), "Plain");
    }

    #[test]
    fn test_sqlite_statements() {
        let meta = EntityMetadata::<Widget>::new(Dialect::Sqlite).unwrap();
        let s = meta.statements();
        assert_eq!(s.select_by_id, "SELECT id, label, weight FROM widgets WHERE id = ?");
        assert_eq!(s.insert, "INSERT INTO widgets (id, label, weight) VALUES (?, ?, ?)");
        assert_eq!(s.update, "UPDATE widgets SET label = ?, weight = ? WHERE id = ?");
        assert_eq!(s.delete_all, "DELETE FROM widgets");
    }

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        let meta = EntityMetadata::<Widget>::new(Dialect::Postgres).unwrap();
        let s = meta.statements();
        assert_eq!(s.insert, "INSERT INTO widgets (id, label, weight) VALUES ($1, $2, $3)");
        assert_eq!(s.update, "UPDATE widgets SET label = $1, weight = $2 WHERE id = $3");
        assert_eq!(s.select_page, "SELECT id, label, weight FROM widgets ORDER BY id LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_mysql_uses_question_mark_placeholders() {
        let meta = EntityMetadata::<Widget>::new(Dialect::MySql).unwrap();
        assert_eq!(meta.statements().exists, "SELECT COUNT(*) FROM widgets WHERE id = ?");
    }

    #[test]
    fn test_select_by_column_rejects_unknown_columns() {
        let meta = EntityMetadata::<Widget>::new(Dialect::Sqlite).unwrap();
        assert_eq!(
            meta.select_by_column("label").unwrap(),
            "SELECT id, label, weight FROM widgets WHERE label = ? ORDER BY id"
        );
        let err = meta.select_by_column("label; DROP TABLE widgets").unwrap_err();
        assert!(matches!(err, StrataError::Validation(_)));
    }

    #[test]
    fn test_mapping_validation() {
        assert!(validate_mapping("W", "widgets", "id", &["a", "b"]).is_ok());
        assert!(validate_mapping("W", "widgets", "id", &[]).is_err());
        assert!(validate_mapping("W", "widgets", "id", &["a", "a"]).is_err());
        assert!(validate_mapping("W", "widgets", "id", &["id", "a"]).is_err());
        assert!(validate_mapping("W", "wid gets", "id", &["a"]).is_err());
        assert!(validate_mapping("W", "widgets", "id", &["1a"]).is_err());
    }
}
