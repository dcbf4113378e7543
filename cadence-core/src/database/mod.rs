//! Persistence ports and their adapters.
//!
//! Services depend only on the traits in [`ports`]. The PostgreSQL adapter is
//! compiled with the `database` feature; the in-memory adapter is always
//! available and backs the test suites.

pub mod memory;
pub mod ports;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::{InMemoryAccountRepository, InMemoryTrackRepository};
pub use ports::{AccountRepository, TrackRepository};
#[cfg(feature = "database")]
pub use postgres::{PostgresAccountRepository, PostgresTrackRepository};
