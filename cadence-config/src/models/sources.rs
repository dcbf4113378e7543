use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{parse_bool, parse_csv};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub limits: FileLimitsConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    /// `local` or `s3`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLimitsConfig {
    /// Humantime string such as `5s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
///
/// Numeric values that carry their own error reporting (`REQUEST_TIMEOUT`,
/// `MAX_UPLOAD_BYTES`) are kept raw and parsed during composition.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_password: Option<String>,
    pub database_name: Option<String>,
    pub storage_type: Option<String>,
    pub upload_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub aws_bucket_name: Option<String>,
    pub aws_region: Option<String>,
    pub aws_endpoint_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub request_timeout: Option<String>,
    pub max_upload_bytes: Option<String>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key).filter(|value| !value.trim().is_empty())
        };

        Self {
            config_path: var("CADENCE_CONFIG").map(PathBuf::from),
            server_host: var("SERVER_HOST"),
            server_port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .and_then(|s| s.trim().parse().ok()),
            database_url: var("DATABASE_URL"),
            database_host: var("DB_HOST"),
            database_port: var("DB_PORT").and_then(|s| s.trim().parse().ok()),
            database_user: var("DB_USER"),
            database_password: var("DB_PASSWORD"),
            database_name: var("DB_NAME"),
            storage_type: var("STORAGE_TYPE"),
            upload_dir: var("UPLOAD_DIR").map(PathBuf::from),
            base_url: var("BASE_URL"),
            aws_bucket_name: var("AWS_BUCKET_NAME"),
            aws_region: var("AWS_REGION"),
            aws_endpoint_url: var("AWS_ENDPOINT_URL"),
            jwt_secret: var("JWT_SECRET"),
            request_timeout: var("REQUEST_TIMEOUT"),
            max_upload_bytes: var("MAX_UPLOAD_BYTES"),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv(&raw)),
            dev_mode: var("DEV_MODE").and_then(|raw| parse_bool(&raw)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> EnvConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn port_falls_back_to_generic_port_var() {
        assert_eq!(env(&[("PORT", "9000")]).server_port, Some(9000));
        assert_eq!(
            env(&[("PORT", "9000"), ("SERVER_PORT", "8081")]).server_port,
            Some(8081)
        );
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = env(&[("JWT_SECRET", "  "), ("DEV_MODE", "true")]);
        assert!(cfg.jwt_secret.is_none());
        assert_eq!(cfg.dev_mode, Some(true));
    }

    #[test]
    fn storage_table_reads_type_key() {
        let file: FileConfig = toml::from_str(
            r#"
            [storage]
            type = "s3"
            bucket = "tracks"
            region = "us-east-1"
            "#,
        )
        .unwrap();
        assert_eq!(file.storage.kind.as_deref(), Some("s3"));
        assert_eq!(file.storage.bucket.as_deref(), Some("tracks"));
    }
}
