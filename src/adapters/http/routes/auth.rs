use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        cookies::{append_cookie, clear_session_cookie, session_cookie},
        routes::AccountView,
    },
    app_error::AppResult,
    application::session::{ADMIN_SESSION_COOKIE, USER_SESSION_COOKIE},
};

#[derive(Deserialize)]
struct GoogleLoginPayload {
    token: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/google", post(google_login))
        .route("/logout", post(logout))
}

/// POST /api/auth/google
/// Exchanges a Google id token for a user session cookie.
async fn google_login(
    State(app_state): State<AppState>,
    Json(payload): Json<GoogleLoginPayload>,
) -> AppResult<impl IntoResponse> {
    let (account, grant) = app_state.auth_use_cases.login(&payload.token).await?;

    let mut headers = HeaderMap::new();
    append_cookie(
        &mut headers,
        session_cookie(
            USER_SESSION_COOKIE,
            grant.token,
            grant.max_age,
            &app_state.config.cookie,
        ),
    )?;

    Ok((StatusCode::OK, headers, Json(AccountView::from(account))))
}

/// POST /api/auth/logout
async fn logout(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut headers = HeaderMap::new();
    clear_session_cookie(&mut headers, USER_SESSION_COOKIE, &app_state.config.cookie)?;
    clear_session_cookie(&mut headers, ADMIN_SESSION_COOKIE, &app_state.config.cookie)?;
    Ok((
        StatusCode::OK,
        headers,
        Json(serde_json::json!({ "message": "Logged out" })),
    ))
}
