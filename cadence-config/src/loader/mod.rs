pub mod db_url;
pub mod error;

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_REQUEST_TIMEOUT, DEFAULT_UPLOAD_DIR,
    DEV_JWT_SECRET, DatabaseConfig, LimitsConfig, ServerConfig, StorageConfig,
};
use crate::util::parse_duration;
use crate::validation::{self, ConfigGuardRailError, ConfigWarnings};
use error::ConfigLoadError;

const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    skip_env_file: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Do not read any `.env` file; only the process environment is used.
    pub fn without_env_file(mut self) -> Self {
        self.skip_env_file = true;
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;
        let env = EnvConfig::gather();
        self.load_with_env(env, env_file_loaded)
    }

    /// Same as [`load`](Self::load) but with an explicit environment snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file, config_path) = self.load_file_config(&env)?;
        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        let (config, warnings) = compose(file, env, metadata)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if self.skip_env_file {
            return Ok(false);
        }
        let result = match &self.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match result {
            Ok(()) => Ok(true),
            Err(dotenvy::Error::Io(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// An explicit or `CADENCE_CONFIG` path must exist; the default
    /// `cadence.toml` is optional.
    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, required) = match (&self.config_path, &env.config_path) {
            (Some(path), _) | (None, Some(path)) => (path.clone(), true),
            (None, None) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents = fs::read_to_string(&path).map_err(|source| {
            ConfigLoadError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let file: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), "loaded configuration file");
        Ok((Some(file), Some(path)))
    }
}

/// Merge file and environment layers over the defaults. Environment values
/// take precedence over file values.
pub fn compose(
    file: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();
    if metadata.config_path.is_none() {
        warnings.push(
            "No cadence.toml detected; using environment and defaults",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        storage: file_storage,
        auth: file_auth,
        limits: file_limits,
        cors: file_cors,
        dev_mode: file_dev_mode,
    } = file.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(8080),
    };

    let database = DatabaseConfig {
        url: db_url::resolve_database_url(&env, &file_database)?,
    };

    let storage_kind = env
        .storage_type
        .clone()
        .or(file_storage.kind)
        .unwrap_or_else(|| "local".to_string());
    let storage = match storage_kind.trim().to_ascii_lowercase().as_str() {
        "local" => StorageConfig::Local {
            upload_dir: env
                .upload_dir
                .clone()
                .or(file_storage.upload_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            base_url: env
                .base_url
                .clone()
                .or(file_storage.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        },
        "s3" => StorageConfig::S3 {
            bucket: env
                .aws_bucket_name
                .clone()
                .or(file_storage.bucket)
                .ok_or(ConfigLoadError::MissingS3Setting {
                    field: "AWS_BUCKET_NAME",
                })?,
            region: env.aws_region.clone().or(file_storage.region).ok_or(
                ConfigLoadError::MissingS3Setting {
                    field: "AWS_REGION",
                },
            )?,
            endpoint_url: env
                .aws_endpoint_url
                .clone()
                .or(file_storage.endpoint_url),
        },
        _ => {
            return Err(ConfigLoadError::UnknownStorageType {
                value: storage_kind,
            });
        }
    };

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let jwt_secret = match env.jwt_secret.clone().or(file_auth.jwt_secret) {
        Some(secret) => secret,
        None if dev_mode => DEV_JWT_SECRET.to_string(),
        None => return Err(ConfigGuardRailError::MissingJwtSecret.into()),
    };
    let auth = AuthConfig { jwt_secret };

    let request_timeout = match env
        .request_timeout
        .clone()
        .or(file_limits.request_timeout)
    {
        Some(raw) => parse_duration(&raw).map_err(|source| {
            ConfigLoadError::InvalidDuration {
                field: "REQUEST_TIMEOUT",
                value: raw.clone(),
                source,
            }
        })?,
        None => DEFAULT_REQUEST_TIMEOUT,
    };
    let max_upload_bytes = match env.max_upload_bytes.clone() {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            ConfigLoadError::InvalidNumber {
                field: "MAX_UPLOAD_BYTES",
                value: raw.clone(),
            }
        })?,
        None => file_limits
            .max_upload_bytes
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
    };
    let limits = LimitsConfig {
        request_timeout,
        max_upload_bytes,
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_else(|| vec!["*".to_string()]),
    };

    let config = Config {
        server,
        database,
        storage,
        auth,
        limits,
        cors,
        dev_mode,
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config)?);
    Ok((config, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn env_with_secret() -> EnvConfig {
        EnvConfig {
            jwt_secret: Some("x".repeat(40)),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let (config, _) =
            compose(None, env_with_secret(), ConfigMetadata::default())
                .unwrap();

        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                upload_dir: PathBuf::from("./uploads"),
                base_url: "http://localhost:8080/uploads".into(),
            }
        );
        assert_eq!(config.limits.request_timeout, Duration::from_secs(5));
        assert_eq!(config.limits.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.cors.is_wildcard_included());
        assert!(!config.dev_mode);
    }

    #[test]
    fn missing_secret_outside_dev_mode_fails() {
        let err = compose(None, EnvConfig::default(), ConfigMetadata::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::GuardRail(ConfigGuardRailError::MissingJwtSecret)
        ));
    }

    #[test]
    fn dev_mode_falls_back_to_placeholder_secret_with_warning() {
        let env = EnvConfig {
            dev_mode: Some(true),
            ..Default::default()
        };
        let (config, warnings) =
            compose(None, env, ConfigMetadata::default()).unwrap();
        assert!(config.auth.is_dev_secret());
        assert!(warnings.iter().any(|w| w.message.contains("JWT_SECRET")));
    }

    #[test]
    fn s3_requires_bucket_and_region() {
        let env = EnvConfig {
            storage_type: Some("S3".into()),
            aws_region: Some("us-east-1".into()),
            ..env_with_secret()
        };
        let err = compose(None, env, ConfigMetadata::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::MissingS3Setting {
                field: "AWS_BUCKET_NAME"
            }
        ));
    }

    #[test]
    fn unknown_storage_type_is_rejected() {
        let env = EnvConfig {
            storage_type: Some("ftp".into()),
            ..env_with_secret()
        };
        assert!(matches!(
            compose(None, env, ConfigMetadata::default()),
            Err(ConfigLoadError::UnknownStorageType { .. })
        ));
    }

    #[test]
    fn bad_timeout_is_reported() {
        let env = EnvConfig {
            request_timeout: Some("eventually".into()),
            ..env_with_secret()
        };
        assert!(matches!(
            compose(None, env, ConfigMetadata::default()),
            Err(ConfigLoadError::InvalidDuration {
                field: "REQUEST_TIMEOUT",
                ..
            })
        ));
    }
}
