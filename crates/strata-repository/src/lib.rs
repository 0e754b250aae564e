//! # Strata Repository
//!
//! Generic data access over SQLx:
//!
//! ```text
//! Service / concrete DAO
//!   ↓  Arc<dyn GenericDao<Customer>>   (DAO interface)
//! SqlGenericDao<Customer>              (SQL rendered from the TableEntity mapping)
//!   ↓  Arc<dyn DatabasePoolInterface>
//! DatabasePool (SQLx Any: MySQL / PostgreSQL / SQLite)
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   entity.rs                  ← TableEntity mapping trait
//!   metadata.rs                ← EntityMetadata, pre-rendered statements
//!   lazy.rs                    ← LazyRef
//!   pool.rs                    ← DatabasePool, Dialect
//!   session.rs                 ← Session, transaction()
//!   dao/
//!     generic_dao.rs           ← GenericDao trait
//!     impl/
//!       sql_generic_dao.rs     ← SqlGenericDao
//! ```
//!
//! Pool-level DAO calls each run in their own transaction. To group several
//! calls, open a [`Session`] (or use [`transaction`]) and call the `_in`
//! variants on [`SqlGenericDao`].

pub mod dao;
pub mod entity;
pub mod lazy;
pub mod metadata;
pub mod pool;
pub mod session;

pub use dao::{GenericDao, SqlGenericDao};
pub use entity::*;
pub use lazy::LazyRef;
pub use metadata::{EntityMetadata, Statements};
pub use pool::*;
pub use session::{transaction, Session};
