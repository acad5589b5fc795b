pub mod auth;
pub mod departments;
pub mod reports;
pub mod votes;
