//! Request guards. Handlers take `UserSession` or `AdminSession` to require
//! the matching session.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    adapters::http::app_state::AppState, app_error::AppError, application::session::Identity,
};

pub struct UserSession(pub Identity);

pub struct AdminSession(pub Identity);

impl FromRequestParts<AppState> for UserSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate_user(&parts.headers)
            .map(UserSession)
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticator
            .authenticate_admin(&parts.headers)
            .map(AdminSession)
    }
}
