use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;

const MAX_DISPLAY_NAME_LEN: usize = 100;
const MAX_BIO_LEN: usize = 1000;

/// A registered account: a unique email bound to a salted password hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("bio", &self.bio)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Account {
    pub fn new(
        email: String,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            email,
            password_hash,
            display_name: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_profile(
        &mut self,
        update: &ProfileUpdate,
        now: DateTime<Utc>,
    ) {
        if let Some(name) = &update.display_name {
            self.display_name = Some(name.clone());
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        self.updated_at = now;
    }
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.bio.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.display_name {
            if name.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: "display_name",
                });
            }
            if name.chars().count() > MAX_DISPLAY_NAME_LEN {
                return Err(ValidationError::TooLong {
                    field: "display_name",
                    max: MAX_DISPLAY_NAME_LEN,
                });
            }
        }
        if let Some(bio) = &self.bio
            && bio.chars().count() > MAX_BIO_LEN
        {
            return Err(ValidationError::TooLong {
                field: "bio",
                max: MAX_BIO_LEN,
            });
        }
        Ok(())
    }
}
