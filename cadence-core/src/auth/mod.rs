//! Credentials, tokens and the session flows built on top of them.

pub mod crypto;
pub mod session;
pub mod tokens;

pub use crypto::{CredentialError, CredentialHasher};
pub use session::SessionService;
pub use tokens::{
    ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS, TokenError, TokenService,
};
