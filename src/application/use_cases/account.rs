use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::app_error::AppResult;
use crate::domain::entities::account::{Account, NewAccount, VerificationStatus};

/// Account Store port. `conditional_update` is the only path that changes
/// `verification_status`.
#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;
    async fn find_by_external_login_id(&self, external_login_id: &str)
    -> AppResult<Option<Account>>;
    /// Handles compare case-insensitively.
    async fn find_by_handle(
        &self,
        handle: &str,
        status: VerificationStatus,
    ) -> AppResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;
    /// Fails with `Conflict` if the external login id is already taken.
    async fn create(&self, account: NewAccount) -> AppResult<Account>;
    /// Applies `mutation` only while the record is still in `expected`.
    /// Returns `None` when the record no longer matches, and `Conflict` when
    /// the result would make two accounts approved for the same handle.
    async fn conditional_update(
        &self,
        id: Uuid,
        expected: VerificationStatus,
        mutation: AccountMutation,
    ) -> AppResult<Option<Account>>;
    /// Stores `credential_hash` and closes the reset window in one write,
    /// only while the account is approved and the open window still holds
    /// `expected_reset_hash` unexpired at `now`. `None` means the window was
    /// consumed, replaced or expired in the meantime.
    async fn consume_reset(
        &self,
        id: Uuid,
        expected_reset_hash: &str,
        credential_hash: String,
        now: NaiveDateTime,
    ) -> AppResult<Option<Account>>;
    async fn refresh_profile(&self, id: Uuid, email: &str, display_name: &str)
    -> AppResult<Account>;
    /// Deletes unless the account is in `protected`. Returns whether a row went away.
    async fn delete_unless(&self, id: Uuid, protected: VerificationStatus) -> AppResult<bool>;
    async fn count_by_status(&self) -> AppResult<StatusCounts>;
    async fn list(&self, filter: &AccountFilter) -> AppResult<Vec<Account>>;
}

/// Field-level edit carried by a conditional update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn apply(self, field: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Set(value) => *field = Some(value),
            Patch::Clear => *field = None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMutation {
    pub status: Option<VerificationStatus>,
    pub external_handle: Patch<String>,
    pub verification_token: Patch<String>,
    pub submission_reference: Patch<String>,
    /// Setting a hash also raises `credential_set`.
    pub credential_hash: Patch<String>,
    pub reset_token_hash: Patch<String>,
    pub reset_token_expires_at: Patch<NaiveDateTime>,
}

impl AccountMutation {
    /// Clears the handle together with everything derived from it.
    pub fn unlink() -> Self {
        Self {
            status: Some(VerificationStatus::Unlinked),
            external_handle: Patch::Clear,
            verification_token: Patch::Clear,
            submission_reference: Patch::Clear,
            ..Default::default()
        }
    }

    pub fn apply(self, account: &mut Account, now: NaiveDateTime) {
        if let Some(status) = self.status {
            account.verification_status = status;
        }
        self.external_handle.apply(&mut account.external_handle);
        self.verification_token.apply(&mut account.verification_token);
        self.submission_reference
            .apply(&mut account.submission_reference);
        if matches!(self.credential_hash, Patch::Set(_)) {
            account.credential_set = true;
        }
        self.credential_hash.apply(&mut account.credential_hash);
        self.reset_token_hash.apply(&mut account.reset_token_hash);
        self.reset_token_expires_at
            .apply(&mut account.reset_token_expires_at);
        account.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOrder {
    NewestUpdated,
    NewestCreated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFilter {
    /// Empty means every status.
    pub statuses: Vec<VerificationStatus>,
    /// Case-insensitive substring over email, handle and display name.
    pub search: Option<String>,
    pub order: AccountOrder,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&account.verification_status) {
            return false;
        }
        let Some(needle) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        [
            Some(account.email.as_str()),
            Some(account.display_name.as_str()),
            account.external_handle.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub unlinked: i64,
    pub claimed: i64,
    pub submitted: i64,
    pub approved: i64,
    pub rejected: i64,
    pub with_credential: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: VerificationStatus, count: i64) {
        self.total += count;
        let slot = match status {
            VerificationStatus::Unlinked => &mut self.unlinked,
            VerificationStatus::Claimed => &mut self.claimed,
            VerificationStatus::Submitted => &mut self.submitted,
            VerificationStatus::Approved => &mut self.approved,
            VerificationStatus::Rejected => &mut self.rejected,
        };
        *slot += count;
    }
}
