//! PostgreSQL adapters implementing the repository ports.

mod accounts;
mod tracks;

pub use accounts::PostgresAccountRepository;
pub use tracks::PostgresTrackRepository;
