use std::fmt;

use cadence_model::{Claims, TokenKind, TokenPair};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::CoreError;

/// Access tokens live for 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh tokens live for 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("token expired")]
    Expired,
    #[error("expected a {expected:?} token")]
    WrongKind { expected: TokenKind },
}

impl From<TokenError> for CoreError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::EmptySecret | TokenError::Signing(_) => {
                CoreError::Internal(err.to_string())
            }
            TokenError::Rejected(_)
            | TokenError::Expired
            | TokenError::WrongKind { .. } => CoreError::InvalidToken,
        }
    }
}

/// Issues and validates HMAC-signed access/refresh token pairs.
///
/// There is no revocation list: a token stays valid until `exp`, and a
/// refresh token may be exchanged any number of times before then.
pub struct TokenService {
    secret: Zeroizing<Vec<u8>>,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret_len", &self.secret.len())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub fn issue_pair(
        &self,
        subject: Uuid,
        email: &str,
    ) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(subject, email, Utc::now())
    }

    pub fn issue_pair_at(
        &self,
        subject: Uuid,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(subject, email, TokenKind::Access, now)?,
            refresh_token: self.sign(subject, email, TokenKind::Refresh, now)?,
        })
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verify signature, algorithm family and expiry against `now`.
    ///
    /// A token whose `exp` equals `now` is already expired.
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let claims =
            decode::<Claims>(token, &self.decoding, &Self::validation())
                .map_err(|err| TokenError::Rejected(err.to_string()))?
                .claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Validate an access token for the bearer gate.
    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        expect_kind(&claims, TokenKind::Access)?;
        Ok(claims)
    }

    /// Exchange a refresh token for a fresh access token. The newly minted
    /// refresh token is discarded; the presented one stays usable until it
    /// expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        self.refresh_at(refresh_token, Utc::now())
    }

    pub fn refresh_at(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = self.validate_at(refresh_token, now)?;
        expect_kind(&claims, TokenKind::Refresh)?;
        let pair = self.issue_pair_at(claims.sub, &claims.email, now)?;
        Ok(pair.access_token)
    }

    fn sign(
        &self,
        subject: Uuid,
        email: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => ACCESS_TOKEN_TTL_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_TTL_SECS,
        };
        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
            kind,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms =
            vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // Expiry is checked by `validate_at` with zero leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation
    }
}

fn expect_kind(claims: &Claims, expected: TokenKind) -> Result<(), TokenError> {
    if claims.kind == expected {
        Ok(())
    } else {
        Err(TokenError::WrongKind { expected })
    }
}
