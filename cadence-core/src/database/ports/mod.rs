//! Repository ports consumed by the core services.

pub mod accounts;
pub mod tracks;

pub use accounts::AccountRepository;
pub use tracks::TrackRepository;
