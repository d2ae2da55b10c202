use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        cookies::{append_cookie, clear_session_cookie, session_cookie},
        extract::AdminSession,
        routes::AccountView,
    },
    app_error::{AppError, AppResult},
    application::session::ADMIN_SESSION_COOKIE,
    domain::entities::account::{Account, VerificationStatus},
};

#[derive(Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct AccountsQuery {
    status: Option<String>,
    search: Option<String>,
}

#[derive(Serialize)]
struct AccountList {
    count: usize,
    accounts: Vec<AccountView>,
}

impl From<Vec<Account>> for AccountList {
    fn from(accounts: Vec<Account>) -> Self {
        Self {
            count: accounts.len(),
            accounts: accounts.into_iter().map(AccountView::from).collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verification-requests", get(verification_requests))
        .route("/verified-accounts", get(verified_accounts))
        .route("/accounts", get(accounts))
        .route("/stats", get(stats))
        .route("/accounts/{id}/approve", post(approve))
        .route("/accounts/{id}/reject", post(reject))
        .route("/accounts/{id}/revoke", post(revoke))
        .route("/accounts/{id}", delete(delete_account))
}

/// POST /api/admin/login
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let grant = app_state
        .auth_use_cases
        .admin_login(&payload.username, &payload.password)
        .await?;

    let mut headers = HeaderMap::new();
    append_cookie(
        &mut headers,
        session_cookie(
            ADMIN_SESSION_COOKIE,
            grant.token,
            grant.max_age,
            &app_state.config.cookie,
        ),
    )?;

    Ok((
        StatusCode::OK,
        headers,
        Json(serde_json::json!({ "message": "Logged in" })),
    ))
}

/// POST /api/admin/logout
async fn logout(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
) -> AppResult<impl IntoResponse> {
    let mut headers = HeaderMap::new();
    clear_session_cookie(&mut headers, ADMIN_SESSION_COOKIE, &app_state.config.cookie)?;
    Ok((
        StatusCode::OK,
        headers,
        Json(serde_json::json!({ "message": "Logged out" })),
    ))
}

async fn verification_requests(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
) -> AppResult<impl IntoResponse> {
    let accounts = app_state.admin_use_cases.verification_requests().await?;
    Ok(Json(AccountList::from(accounts)))
}

async fn verified_accounts(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
) -> AppResult<impl IntoResponse> {
    let accounts = app_state.admin_use_cases.verified_accounts().await?;
    Ok(Json(AccountList::from(accounts)))
}

/// GET /api/admin/accounts?status=&search=
/// An empty or `all` status means no status filter.
async fn accounts(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
    Query(query): Query<AccountsQuery>,
) -> AppResult<impl IntoResponse> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) if s.eq_ignore_ascii_case("all") => None,
        Some(s) => Some(
            s.parse::<VerificationStatus>()
                .map_err(|_| AppError::InvalidInput(format!("Unknown status filter: {s}")))?,
        ),
    };

    let accounts = app_state
        .admin_use_cases
        .search_accounts(status, query.search.as_deref())
        .await?;
    Ok(Json(AccountList::from(accounts)))
}

async fn stats(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
) -> AppResult<impl IntoResponse> {
    Ok(Json(app_state.admin_use_cases.stats().await?))
}

async fn approve(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let account = app_state.verification_use_cases.approve(id).await?;
    Ok(Json(AccountView::from(account)))
}

async fn reject(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let account = app_state.verification_use_cases.reject(id).await?;
    Ok(Json(AccountView::from(account)))
}

async fn revoke(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let account = app_state.verification_use_cases.revoke(id).await?;
    Ok(Json(AccountView::from(account)))
}

async fn delete_account(
    State(app_state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    app_state.admin_use_cases.delete_account(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
