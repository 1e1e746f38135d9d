//! Error types for PizzaMock

use thiserror::Error;

/// Result type alias using PizzaMock Error
pub type Result<T> = std::result::Result<T, Error>;

/// PizzaMock error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown fixture: {0} (expected one of: storefront, profiles)")]
    InvalidFixture(String),

    #[error("Invalid route pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
