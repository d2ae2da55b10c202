pub mod admin;
pub mod auth;
pub mod password;
pub mod user;

use axum::{Json, Router, routing::get};
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::account::{Account, VerificationStatus},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router())
        .nest("/user", user::router())
        .nest("/password", password::router())
        .nest("/admin", admin::router())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Account as returned over HTTP. Credential and reset material never leave
/// the server.
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub verification_status: VerificationStatus,
    pub external_handle: Option<String>,
    pub verification_token: Option<String>,
    pub submission_reference: Option<String>,
    pub credential_set: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            verification_status: account.verification_status,
            external_handle: account.external_handle,
            verification_token: account.verification_token,
            submission_reference: account.submission_reference,
            credential_set: account.credential_set,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}
