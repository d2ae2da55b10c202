//! Test utilities for use-case and HTTP-level tests.
//!
//! This module provides:
//! - Test data factories for creating valid accounts
//! - In-memory implementations of the ports (account store, identity
//!   verifier, email sender, rate limiter)
//! - `TestAppStateBuilder` for driving the real routers with `axum-test`

mod account_mocks;
mod app_state_builder;
mod auth_mocks;
mod factories;

pub use account_mocks::*;
pub use app_state_builder::*;
pub use auth_mocks::*;
pub use factories::*;
