pub mod auth;
pub mod health;
pub mod tracks;
pub mod users;
