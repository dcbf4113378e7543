use std::sync::OnceLock;

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use password_hash::Error as PasswordHashError;
use rand::{TryRngCore, rngs::OsRng};
use thiserror::Error;
use zeroize::Zeroizing;

/// Argon2id password hashing with fixed cost parameters.
///
/// Every stored hash is produced with the same cost; verification reads the
/// parameters back out of the PHC string.
#[derive(Debug)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy_hash: OnceLock<String>,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

impl From<CredentialError> for crate::error::CoreError {
    fn from(err: CredentialError) -> Self {
        crate::error::CoreError::Internal(err.to_string())
    }
}

impl From<PasswordHashError> for CredentialError {
    fn from(err: PasswordHashError) -> Self {
        CredentialError::PasswordHash(err.to_string())
    }
}

impl CredentialHasher {
    /// 19 MiB memory, 2 passes, single lane.
    const MEMORY_KIB: u32 = 19 * 1024;
    const ITERATIONS: u32 = 2;
    const PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    pub fn new() -> Result<Self, CredentialError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::MEMORY_KIB)
            .t_cost(Self::ITERATIONS)
            .p_cost(Self::PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| {
                CredentialError::InvalidArgon2Params(err.to_string())
            })?;

        Ok(Self::with_params(params))
    }

    fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(
                Algorithm::Argon2id,
                Version::default(),
                params,
            ),
            dummy_hash: OnceLock::new(),
        }
    }

    /// Hash a password with a fresh random salt. The PHC string is suitable
    /// for storage.
    pub fn hash_password(
        &self,
        password: &str,
    ) -> Result<String, CredentialError> {
        let material = Zeroizing::new(password.as_bytes().to_vec());

        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| CredentialError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        Ok(self.argon2.hash_password(&material, &salt)?.to_string())
    }

    /// Verify a password against a stored PHC string.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|err| CredentialError::MalformedHash(err.to_string()))?;
        let material = Zeroizing::new(password.as_bytes().to_vec());
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    /// Burn the same amount of work as a real verification. Used when the
    /// account does not exist so both login failure paths cost about the same.
    pub fn verify_against_dummy(
        &self,
        password: &str,
    ) -> Result<(), CredentialError> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash,
            None => {
                let hash = self.hash_password("cadence-dummy-credential")?;
                self.dummy_hash.get_or_init(|| hash)
            }
        };
        self.verify_password(password, hash)?;
        Ok(())
    }
}
