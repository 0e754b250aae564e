//! # Strata Config
//!
//! Layered configuration for the Strata data-access layer: TOML files,
//! a `.env` file and `STRATA_`-prefixed environment variables, with
//! runtime reload.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
