//! DAO (Data Access Object) layer.
//!
//! [`GenericDao`] is the interface every entity DAO shares. Implementations
//! are organized by technology under `impl/`.
//!
//! ```text
//! Service → Arc<dyn GenericDao<E>> → SqlGenericDao<E> → DatabasePool → DB
//! ```

pub mod generic_dao;
pub mod r#impl;

pub use generic_dao::GenericDao;
pub use r#impl::SqlGenericDao;
