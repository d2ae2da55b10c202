pub mod account;
pub mod role;
pub mod transition;
