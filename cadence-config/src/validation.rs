use thiserror::Error;

use super::models::{Config, StorageConfig};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("JWT_SECRET must be set when DEV_MODE is false")]
    MissingJwtSecret,
    #[error(
        "JWT_SECRET uses the development placeholder while DEV_MODE is false"
    )]
    DevSecretOutsideDevMode,
    #[error("MAX_UPLOAD_BYTES must be greater than zero")]
    ZeroUploadLimit,
    #[error("REQUEST_TIMEOUT must be greater than zero")]
    ZeroRequestTimeout,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.limits.max_upload_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroUploadLimit);
    }
    if config.limits.request_timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroRequestTimeout);
    }

    if config.dev_mode {
        if config.auth.is_dev_secret() {
            warnings.push_with_hint(
                "JWT_SECRET not set; using the built-in development secret",
                "Set JWT_SECRET before exposing this server",
            );
        }
    } else {
        if config.auth.is_dev_secret() {
            return Err(ConfigGuardRailError::DevSecretOutsideDevMode);
        }
        if config.auth.jwt_secret.len() < MIN_SECRET_LENGTH {
            warnings.push(format!(
                "JWT_SECRET is shorter than {MIN_SECRET_LENGTH} characters"
            ));
        }
    }

    if config.cors.is_wildcard_included() && !config.dev_mode {
        warnings.push_with_hint(
            "CORS allows any origin",
            "Set CORS_ALLOWED_ORIGINS to the front-end origins you serve",
        );
    }

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL or DB_HOST/DB_USER/DB_NAME",
        );
    }

    if let StorageConfig::Local { base_url, .. } = &config.storage
        && url::Url::parse(base_url).is_err()
    {
        warnings.push(format!("BASE_URL '{base_url}' is not an absolute URL"));
    }

    Ok(warnings)
}
