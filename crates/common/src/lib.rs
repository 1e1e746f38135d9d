//! PizzaMock Common Library
//!
//! Shared domain types, seed fixtures and errors for the PizzaMock backend
//! and its scenario runner.

pub mod error;
pub mod fixtures;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use fixtures::{Catalog, Fixture, FixtureKind};
pub use types::*;

/// PizzaMock version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
