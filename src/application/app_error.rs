use thiserror::Error;

use crate::domain::entities::account::VerificationStatus;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account store unavailable: {0}")]
    TransientStore(String),

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Insufficient role")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity assertion rejected")]
    InvalidAssertion,

    #[error("Cannot {action} while verification status is {current}")]
    InvalidState {
        action: &'static str,
        current: VerificationStatus,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Account must be verified first")]
    MustBeVerified,

    #[error("Reset window expired or not open")]
    Expired,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::TransientStore(_) => ErrorCode::TransientStoreFailure,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Unauthenticated => ErrorCode::Unauthenticated,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::Forbidden => ErrorCode::Forbidden,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::InvalidAssertion => ErrorCode::InvalidAssertion,
            AppError::InvalidState { .. } => ErrorCode::InvalidState,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::MustBeVerified => ErrorCode::MustBeVerified,
            AppError::Expired => ErrorCode::Expired,
            AppError::InvalidResetToken => ErrorCode::InvalidResetToken,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Store failures are never partially applied, so the whole call may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientStore(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    TransientStoreFailure,
    RateLimited,
    Unauthenticated,
    InvalidToken,
    Forbidden,
    InvalidCredentials,
    InvalidAssertion,
    InvalidState,
    Conflict,
    MustBeVerified,
    Expired,
    InvalidResetToken,
    InvalidInput,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TransientStoreFailure => "TRANSIENT_STORE_FAILURE",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidAssertion => "INVALID_ASSERTION",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::MustBeVerified => "MUST_BE_VERIFIED",
            ErrorCode::Expired => "EXPIRED",
            ErrorCode::InvalidResetToken => "INVALID_RESET_TOKEN",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
