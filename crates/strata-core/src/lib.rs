//! # Strata Core
//!
//! Core types, traits, and error definitions shared by every Strata crate:
//! the unified error type, pagination, typed identifiers, driver-neutral
//! column values, the [`Entity`] trait and tracing initialisation.

pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod value;

pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use telemetry::*;
pub use traits::*;
pub use value::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
