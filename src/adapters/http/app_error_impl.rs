use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let code = self.code();

        // Log the error before it gets converted into a status response.
        if status.is_server_error() {
            tracing::error!(error = %self, code = code.as_str(), "Request failed");
        } else {
            tracing::warn!(error = %self, code = code.as_str(), "Request rejected");
        }

        match self {
            AppError::InvalidState { current, .. } => {
                let body = serde_json::json!({
                    "code": code.as_str(),
                    "message": self.to_string(),
                    "current_status": current,
                });
                (status, Json(body)).into_response()
            }
            AppError::InvalidInput(msg) | AppError::Conflict(msg) => {
                error_resp(status, code, Some(msg))
            }
            AppError::MustBeVerified | AppError::Expired | AppError::InvalidResetToken => {
                error_resp(status, code, Some(self.to_string()))
            }
            // Store and internal details stay in the logs.
            _ => error_resp(status, code, None),
        }
    }
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Unauthenticated
        | AppError::InvalidToken
        | AppError::InvalidCredentials
        | AppError::InvalidAssertion
        | AppError::InvalidResetToken
        | AppError::Expired => StatusCode::UNAUTHORIZED,
        AppError::Forbidden | AppError::MustBeVerified => StatusCode::FORBIDDEN,
        AppError::InvalidState { .. } | AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound => StatusCode::NOT_FOUND,
        AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AppError::TransientStore(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
