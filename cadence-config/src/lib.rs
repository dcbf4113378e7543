//! Configuration for Cadence.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `.env` and the process environment. [`ConfigLoader`] performs the whole
//! pipeline; [`loader::compose`] is the pure merge step behind it.
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, compose, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    LimitsConfig, ServerConfig, StorageConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
