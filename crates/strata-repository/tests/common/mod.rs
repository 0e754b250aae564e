//! Common test infrastructure for DAO integration tests.
//!
//! Every test gets its own in-memory SQLite database behind the `Any` driver,
//! so the SQL exercised here is the same the DAO renders for other backends
//! apart from placeholder syntax.

#![allow(dead_code)]

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use strata_config::DatabaseConfig;
use strata_core::{Entity, SqlValue, StrataResult, TypedId};
use strata_repository::{
    parse_timestamp, parse_uuid, DatabasePool, DatabasePoolInterface, SqlGenericDao, TableEntity,
};

const SCHEMA: &str = r"
CREATE TABLE customers (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    tier        INTEGER NOT NULL,
    balance     REAL NOT NULL,
    note        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE products (
    id     INTEGER PRIMARY KEY,
    sku    TEXT NOT NULL UNIQUE,
    title  TEXT NOT NULL,
    price  REAL NOT NULL
);
";

// =============================================================================
// Test entities
// =============================================================================

pub type CustomerId = TypedId<Customer>;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub tier: i64,
    pub balance: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow)]
pub struct CustomerRow {
    id: String,
    name: String,
    email: String,
    tier: i64,
    balance: f64,
    note: Option<String>,
    created_at: String,
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &CustomerId {
        &self.id
    }
}

impl TableEntity for Customer {
    const TABLE: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &["name", "email", "tier", "balance", "note", "created_at"];
    type Row = CustomerRow;

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.name.clone().into(),
            self.email.clone().into(),
            self.tier.into(),
            self.balance.into(),
            self.note.clone().into(),
            self.created_at.into(),
        ]
    }

    fn from_row(row: CustomerRow) -> StrataResult<Self> {
        Ok(Self {
            id: parse_uuid("id", &row.id)?.into(),
            name: row.name,
            email: row.email,
            tier: row.tier,
            balance: row.balance,
            note: row.note,
            created_at: parse_timestamp("created_at", &row.created_at)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub price: f64,
}

#[derive(FromRow)]
pub struct ProductRow {
    id: i64,
    sku: String,
    title: String,
    price: f64,
}

impl Entity for Product {
    type Id = i64;

    fn id(&self) -> &i64 {
        &self.id
    }
}

impl TableEntity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] = &["sku", "title", "price"];
    type Row = ProductRow;

    fn values(&self) -> Vec<SqlValue> {
        vec![self.sku.clone().into(), self.title.clone().into(), self.price.into()]
    }

    fn from_row(row: ProductRow) -> StrataResult<Self> {
        Ok(Self {
            id: row.id,
            sku: row.sku,
            title: row.title,
            price: row.price,
        })
    }
}

pub fn create_test_customer(name: &str, tier: i64) -> Customer {
    Customer {
        id: CustomerId::new(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        tier,
        balance: 0.0,
        note: None,
        // stored with microsecond precision
        created_at: Utc::now().trunc_subsecs(6),
    }
}

pub fn create_test_product(id: i64, sku: &str, price: f64) -> Product {
    Product {
        id,
        sku: sku.to_string(),
        title: format!("Product {}", sku),
        price,
    }
}

// =============================================================================
// Test database
// =============================================================================

/// In-memory database with the test schema applied.
///
/// The pool holds a single connection, so a test must not call pool-level
/// DAO methods while it holds an open `Session`.
pub struct TestDatabase {
    pool: Arc<DatabasePool>,
}

impl TestDatabase {
    pub async fn new() -> Self {
        let pool = DatabasePool::new(&DatabaseConfig::in_memory_sqlite())
            .await
            .expect("Failed to open in-memory database");

        pool.execute_script(SCHEMA)
            .await
            .expect("Failed to create schema");

        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> Arc<DatabasePool> {
        Arc::clone(&self.pool)
    }

    pub fn customers(&self) -> Arc<SqlGenericDao<Customer>> {
        Arc::new(SqlGenericDao::new(self.pool.clone()).expect("Failed to build customer DAO"))
    }

    pub fn products(&self) -> Arc<SqlGenericDao<Product>> {
        Arc::new(SqlGenericDao::new(self.pool.clone()).expect("Failed to build product DAO"))
    }
}
