pub mod app_error_impl;
pub mod app_state;
pub mod cookies;
pub mod extract;
pub mod middleware;
pub mod routes;
