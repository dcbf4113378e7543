use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ConfigGuardRailError;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },

    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },

    #[error("invalid database username '{username}'")]
    InvalidDatabaseUsername { username: String },

    #[error("failed to encode database password into URL")]
    InvalidDatabasePassword,

    #[error("unknown storage type '{value}' (expected `local` or `s3`)")]
    UnknownStorageType { value: String },

    #[error("s3 storage requires {field}")]
    MissingS3Setting { field: &'static str },

    #[error("invalid duration for {field}: '{value}'")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),

    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
