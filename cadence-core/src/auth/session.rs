use std::sync::Arc;
use std::time::Duration;

use cadence_model::{Account, TokenPair};
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::crypto::{CredentialError, CredentialHasher};
use super::tokens::TokenService;
use crate::database::ports::AccountRepository;
use crate::deadline::within;
use crate::error::{CoreError, CoreResult};

/// Registration, login and access-token refresh.
#[derive(Clone)]
pub struct SessionService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
    hasher: Arc<CredentialHasher>,
    budget: Duration,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

/// Emails are compared case-insensitively and without surrounding
/// whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl SessionService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
        hasher: Arc<CredentialHasher>,
        budget: Duration,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
            budget,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Create an account. `Conflict` when the email is taken, checked here
    /// and again by the repository's unique constraint.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> CoreResult<Account> {
        let email = normalize_email(email);
        let password = Zeroizing::new(password.to_string());

        within(self.budget, async {
            if self.accounts.get_by_email(&email).await?.is_some() {
                debug!(email = %email, "registration rejected: email taken");
                return Err(CoreError::Conflict);
            }

            let password_hash = self.hash_blocking(password).await?;
            let account = Account::new(email, password_hash, Utc::now());
            self.accounts.create(&account).await?;

            info!(account_id = %account.id, "registered account");
            Ok(account)
        })
        .await
    }

    /// Verify credentials and mint a token pair. Unknown emails, wrong
    /// passwords and unreadable stored hashes are indistinguishable to the
    /// caller.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> CoreResult<TokenPair> {
        let email = normalize_email(email);
        let password = Zeroizing::new(password.to_string());

        within(self.budget, async {
            let Some(account) = self.accounts.get_by_email(&email).await?
            else {
                self.dummy_verify_blocking(password).await?;
                debug!("login failed: unknown email");
                return Err(CoreError::InvalidCredentials);
            };

            let verified = self
                .verify_blocking(
                    account.id,
                    password,
                    account.password_hash.clone(),
                )
                .await?;
            if !verified {
                warn!(account_id = %account.id, "login failed: wrong password");
                return Err(CoreError::InvalidCredentials);
            }

            let pair = self.tokens.issue_pair(account.id, &account.email)?;
            info!(account_id = %account.id, "issued token pair");
            Ok(pair)
        })
        .await
    }

    /// Exchange a refresh token for a new access token. Every failure maps
    /// to `InvalidToken`.
    pub fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> CoreResult<String> {
        self.tokens.refresh(refresh_token).map_err(|err| {
            debug!(error = %err, "refresh rejected");
            CoreError::InvalidToken
        })
    }

    /// Resolve a bearer token to the account it was issued for.
    pub fn authenticate(
        &self,
        access_token: &str,
    ) -> CoreResult<(Uuid, String)> {
        let claims = self.tokens.validate_access(access_token)?;
        Ok((claims.sub, claims.email))
    }

    async fn hash_blocking(
        &self,
        password: Zeroizing<String>,
    ) -> CoreResult<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|err| {
                CoreError::internal(format!("hashing task failed: {err}"))
            })?
            .map_err(CoreError::from)
    }

    /// A stored hash that cannot be parsed counts as a failed verification.
    async fn verify_blocking(
        &self,
        account_id: Uuid,
        password: Zeroizing<String>,
        password_hash: String,
    ) -> CoreResult<bool> {
        let hasher = Arc::clone(&self.hasher);
        let outcome = tokio::task::spawn_blocking(move || {
            hasher.verify_password(&password, &password_hash)
        })
        .await
        .map_err(|err| {
            CoreError::internal(format!("verify task failed: {err}"))
        })?;

        match outcome {
            Ok(verified) => Ok(verified),
            Err(CredentialError::MalformedHash(reason)) => {
                warn!(
                    account_id = %account_id,
                    reason = %reason,
                    "stored password hash is malformed"
                );
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn dummy_verify_blocking(
        &self,
        password: Zeroizing<String>,
    ) -> CoreResult<()> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || {
            hasher.verify_against_dummy(&password)
        })
        .await
        .map_err(|err| {
            CoreError::internal(format!("verify task failed: {err}"))
        })?
        .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email("  Mixed@Example.COM "),
            "mixed@example.com"
        );
    }
}
