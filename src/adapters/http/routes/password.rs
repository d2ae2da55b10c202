use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

/// Same answer whether or not the email is registered.
const RESET_REQUESTED_MESSAGE: &str =
    "If the email belongs to a verified account, a password reset link has been sent";

#[derive(Deserialize)]
struct ForgotPayload {
    email: String,
}

#[derive(Deserialize)]
struct ResetPayload {
    email: String,
    token: String,
    new_password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forgot", post(forgot))
        .route("/reset", post(reset))
}

/// POST /api/password/forgot
async fn forgot(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .password_reset_use_cases
        .request_reset(&payload.email)
        .await?;
    Ok(Json(serde_json::json!({ "message": RESET_REQUESTED_MESSAGE })))
}

/// POST /api/password/reset
async fn reset(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .password_reset_use_cases
        .complete_reset(&payload.email, &payload.token, &payload.new_password)
        .await?;
    Ok(Json(serde_json::json!({
        "message": "Password reset. You can now sign in with your new password."
    })))
}
