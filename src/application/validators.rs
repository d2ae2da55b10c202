use validator::ValidateEmail;

use crate::app_error::{AppError, AppResult};

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_HANDLE_LEN: usize = 64;
const MAX_SUBMISSION_REF_LEN: usize = 128;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Normalizes a claimed handle. Rules:
/// - non-empty after trimming
/// - no inner whitespace
/// - at most 64 characters
pub fn normalize_handle(handle: &str) -> AppResult<String> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(AppError::InvalidInput("Handle is required".into()));
    }
    if handle.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidInput(
            "Handle must not contain whitespace".into(),
        ));
    }
    if handle.chars().count() > MAX_HANDLE_LEN {
        return Err(AppError::InvalidInput("Handle is too long".into()));
    }
    Ok(handle.to_string())
}

pub fn normalize_submission_reference(reference: &str) -> AppResult<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(AppError::InvalidInput(
            "Submission reference is required".into(),
        ));
    }
    if reference.chars().count() > MAX_SUBMISSION_REF_LEN {
        return Err(AppError::InvalidInput(
            "Submission reference is too long".into(),
        ));
    }
    Ok(reference.to_string())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
