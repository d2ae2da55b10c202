pub mod account;
pub mod admin;
pub mod auth;
pub mod password_reset;
pub mod verification;
