//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::account::{Account, VerificationStatus};

/// Create a test account with sensible defaults (fresh, unlinked, no credential).
pub fn create_test_account(overrides: impl FnOnce(&mut Account)) -> Account {
    let id = Uuid::new_v4();
    let mut account = Account {
        id,
        external_login_id: format!("google-{}", id.simple()),
        email: format!("user-{}@example.com", &id.simple().to_string()[..8]),
        display_name: "Test User".to_string(),
        verification_status: VerificationStatus::Unlinked,
        external_handle: None,
        verification_token: None,
        submission_reference: None,
        credential_hash: None,
        credential_set: false,
        reset_token_hash: None,
        reset_token_expires_at: None,
        created_at: test_datetime(),
        updated_at: test_datetime(),
    };
    overrides(&mut account);
    account
}

/// Returns a fixed test datetime for reproducible tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

/// Returns a test datetime offset by the given number of days.
pub fn test_datetime_offset_days(days: i64) -> NaiveDateTime {
    test_datetime() + chrono::Duration::days(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_account_defaults() {
        let account = create_test_account(|_| {});
        assert_eq!(account.verification_status, VerificationStatus::Unlinked);
        assert!(account.external_handle.is_none());
        assert!(!account.credential_set);
        assert!(account.email.ends_with("@example.com"));
    }

    #[test]
    fn test_create_test_account_overrides() {
        let account = create_test_account(|a| {
            a.email = "custom@example.com".to_string();
            a.verification_status = VerificationStatus::Approved;
        });
        assert_eq!(account.email, "custom@example.com");
        assert_eq!(account.verification_status, VerificationStatus::Approved);
    }

    #[test]
    fn test_accounts_get_distinct_identities() {
        let a = create_test_account(|_| {});
        let b = create_test_account(|_| {});
        assert_ne!(a.id, b.id);
        assert_ne!(a.external_login_id, b.external_login_id);
        assert_ne!(a.email, b.email);
    }
}
