//! Core library for Cadence.
//!
//! Holds the parts of the service with real contracts:
//!
//! - [`auth`]: password hashing, token issuance/validation and the
//!   register/login/refresh flows.
//! - [`storage`]: the [`storage::BlobStore`] capability with local-disk,
//!   S3 and in-memory backends.
//! - [`catalog`]: coordination between track rows and their blobs.
//! - [`account`]: profile reads and patches.
//! - [`database`]: repository ports plus PostgreSQL and in-memory adapters.
#![allow(missing_docs)]

pub mod account;
pub mod auth;
pub mod catalog;
pub mod database;
pub mod deadline;
pub mod error;
pub mod storage;

pub use account::AccountService;
pub use auth::{CredentialHasher, SessionService, TokenService};
pub use catalog::{CatalogService, TrackUploads};
pub use deadline::DEFAULT_REQUEST_BUDGET;
pub use error::{CoreError, CoreResult};

/// Embedded schema migrations for the PostgreSQL adapter.
#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
