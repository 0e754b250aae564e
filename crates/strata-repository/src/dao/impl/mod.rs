//! DAO implementations.

mod sql_generic_dao;

pub use sql_generic_dao::SqlGenericDao;
