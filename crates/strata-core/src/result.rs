//! Result type aliases for Strata.

use crate::StrataError;

/// A specialized `Result` type for Strata operations.
pub type StrataResult<T> = Result<T, StrataError>;

/// A boxed future returning a `StrataResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = StrataResult<T>> + Send + 'a>>;
