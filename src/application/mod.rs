pub mod app_error;
pub mod credentials;
pub mod jwt;
pub mod session;
pub mod use_cases;
pub mod validators;
