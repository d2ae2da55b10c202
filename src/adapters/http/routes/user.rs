use axum::{Json, Router, extract::State, response::IntoResponse, routing::{get, post}};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, extract::UserSession, routes::AccountView},
    app_error::AppResult,
    domain::entities::account::Account,
};

#[derive(Deserialize)]
struct ClaimPayload {
    handle: String,
}

#[derive(Deserialize)]
struct SubmitPayload {
    reference: String,
}

#[derive(Deserialize)]
struct SetPasswordPayload {
    password: String,
}

#[derive(Deserialize)]
struct ChangePasswordPayload {
    new_password: String,
}

#[derive(Serialize)]
struct AccountResponse {
    message: &'static str,
    account: AccountView,
}

fn respond(message: &'static str, account: Account) -> Json<AccountResponse> {
    Json(AccountResponse {
        message,
        account: account.into(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/claim", post(claim))
        .route("/submit", post(submit))
        .route("/delink", post(delink))
        .route("/reset-verification", post(reset_verification))
        .route("/set-password", post(set_password))
        .route("/change-password", post(change_password))
}

/// GET /api/user/status
async fn status(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .account(identity.account_id()?)
        .await?;
    Ok(Json(AccountView::from(account)))
}

/// POST /api/user/claim
/// Links a handle and returns the token to place on the external profile.
async fn claim(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
    Json(payload): Json<ClaimPayload>,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .claim(identity.account_id()?, &payload.handle)
        .await?;
    Ok(respond(
        "Handle claimed. Add the verification token to your profile, then submit.",
        account,
    ))
}

/// POST /api/user/submit
async fn submit(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
    Json(payload): Json<SubmitPayload>,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .submit(identity.account_id()?, &payload.reference)
        .await?;
    Ok(respond("Submission received. Waiting for review.", account))
}

/// POST /api/user/delink
async fn delink(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .delink(identity.account_id()?)
        .await?;
    Ok(respond("Handle unlinked", account))
}

/// POST /api/user/reset-verification
async fn reset_verification(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .reset_verification(identity.account_id()?)
        .await?;
    Ok(respond(
        "Verification reset. You can claim the same or a different handle.",
        account,
    ))
}

/// POST /api/user/set-password
async fn set_password(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
    Json(payload): Json<SetPasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .set_credential(identity.account_id()?, &payload.password)
        .await?;
    Ok(respond("Password set", account))
}

/// POST /api/user/change-password
async fn change_password(
    State(app_state): State<AppState>,
    UserSession(identity): UserSession,
    Json(payload): Json<ChangePasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .verification_use_cases
        .change_credential(identity.account_id()?, &payload.new_password)
        .await?;
    Ok(respond("Password changed", account))
}
