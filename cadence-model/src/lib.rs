//! Core data model definitions shared across Cadence crates.
#![allow(missing_docs)]

pub mod account;
pub mod api_types;
pub mod auth;
pub mod error;
pub mod track;

// Intentionally curated re-exports for downstream consumers.
pub use account::{Account, ProfileUpdate};
pub use api_types::{ApiResponse, MessageResponse};
pub use auth::{
    AccessTokenResponse, Claims, LoginRequest, RefreshRequest,
    RegisterRequest, TokenKind, TokenPair, TokenResponse,
};
pub use error::ValidationError;
pub use track::{MediaSlot, NewTrack, Track, TrackPatch};
