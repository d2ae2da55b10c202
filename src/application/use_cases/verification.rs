use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::{credentials, validators};
use crate::domain::entities::{
    account::{Account, VerificationStatus},
    transition::Transition,
};

use super::account::{AccountMutation, AccountRepo, Patch};

/// Table-driven verification lifecycle. Every trigger checks the exact
/// current state and commits through a single conditional update.
#[derive(Clone)]
pub struct VerificationUseCases {
    repo: Arc<dyn AccountRepo>,
}

impl VerificationUseCases {
    pub fn new(repo: Arc<dyn AccountRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn account(&self, account_id: Uuid) -> AppResult<Account> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    // ========================================================================
    // User-driven transitions
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn claim(&self, account_id: Uuid, handle: &str) -> AppResult<Account> {
        let handle = validators::normalize_handle(handle)?;
        let account = self.account(account_id).await?;
        guard(&account, Transition::Claim)?;

        // Advisory only; approval re-checks atomically.
        if self
            .repo
            .find_by_handle(&handle, VerificationStatus::Approved)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "This handle is already verified by another account".into(),
            ));
        }

        let mutation = AccountMutation {
            external_handle: Patch::Set(handle),
            verification_token: Patch::Set(credentials::generate_verification_token()),
            submission_reference: Patch::Clear,
            ..Default::default()
        };
        self.commit(account, Transition::Claim, mutation).await
    }

    #[instrument(skip(self))]
    pub async fn submit(&self, account_id: Uuid, reference: &str) -> AppResult<Account> {
        let reference = validators::normalize_submission_reference(reference)?;
        let account = self.account(account_id).await?;
        guard(&account, Transition::Submit)?;

        let mutation = AccountMutation {
            submission_reference: Patch::Set(reference),
            ..Default::default()
        };
        self.commit(account, Transition::Submit, mutation).await
    }

    #[instrument(skip(self))]
    pub async fn reset_verification(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.account(account_id).await?;
        guard(&account, Transition::ResetVerification)?;
        self.commit(account, Transition::ResetVerification, AccountMutation::unlink())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delink(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.account(account_id).await?;
        guard(&account, Transition::Delink)?;
        self.commit(account, Transition::Delink, AccountMutation::unlink())
            .await
    }

    #[instrument(skip(self, secret))]
    pub async fn set_credential(&self, account_id: Uuid, secret: &str) -> AppResult<Account> {
        validators::validate_password(secret)?;
        let account = self.account(account_id).await?;
        guard(&account, Transition::SetCredential)?;

        let credential_hash = credentials::hash_secret_async(secret.to_owned()).await?;
        let mutation = AccountMutation {
            credential_hash: Patch::Set(credential_hash),
            ..Default::default()
        };
        self.commit(account, Transition::SetCredential, mutation)
            .await
    }

    #[instrument(skip(self, new_secret))]
    pub async fn change_credential(&self, account_id: Uuid, new_secret: &str) -> AppResult<Account> {
        validators::validate_password(new_secret)?;
        let account = self.account(account_id).await?;
        guard(&account, Transition::ChangeCredential)?;
        if !account.credential_set {
            return Err(AppError::InvalidInput(
                "No password set. Please set a password first.".into(),
            ));
        }

        let credential_hash = credentials::hash_secret_async(new_secret.to_owned()).await?;
        let mutation = AccountMutation {
            credential_hash: Patch::Set(credential_hash),
            ..Default::default()
        };
        self.commit(account, Transition::ChangeCredential, mutation)
            .await
    }

    // ========================================================================
    // Admin-only transitions
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn approve(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.account(account_id).await?;
        guard(&account, Transition::Approve)?;

        let handle = account
            .external_handle
            .as_deref()
            .ok_or_else(|| AppError::Internal("Submitted account has no handle".into()))?;
        if let Some(holder) = self
            .repo
            .find_by_handle(handle, VerificationStatus::Approved)
            .await?
            && holder.id != account.id
        {
            return Err(handle_taken());
        }

        // The store rejects a second approved holder of the handle with Conflict.
        let approved = self
            .commit(account, Transition::Approve, AccountMutation::default())
            .await?;
        tracing::info!(account_id = %approved.id, handle = ?approved.external_handle, "Handle approved");
        Ok(approved)
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.account(account_id).await?;
        guard(&account, Transition::Reject)?;
        self.commit(account, Transition::Reject, AccountMutation::default())
            .await
    }

    #[instrument(skip(self))]
    pub async fn revoke(&self, account_id: Uuid) -> AppResult<Account> {
        let account = self.account(account_id).await?;
        guard(&account, Transition::Revoke)?;

        let mutation = AccountMutation {
            external_handle: Patch::Clear,
            verification_token: Patch::Clear,
            submission_reference: Patch::Clear,
            ..Default::default()
        };
        self.commit(account, Transition::Revoke, mutation).await
    }

    /// Writes `mutation` plus the trigger's target status, provided the
    /// record is still in the state the guard saw.
    async fn commit(
        &self,
        account: Account,
        trigger: Transition,
        mut mutation: AccountMutation,
    ) -> AppResult<Account> {
        let from = account.verification_status;
        mutation.status = Some(guard(&account, trigger)?);

        let updated = match self
            .repo
            .conditional_update(account.id, from, mutation)
            .await
        {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                // Lost a race; report the state the record moved to.
                let current = self.account(account.id).await?;
                return Err(AppError::InvalidState {
                    action: trigger.as_str(),
                    current: current.verification_status,
                });
            }
            Err(AppError::Conflict(_)) if trigger == Transition::Approve => {
                return Err(handle_taken());
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            account_id = %updated.id,
            %trigger,
            %from,
            to = %updated.verification_status,
            "Verification transition applied"
        );
        Ok(updated)
    }
}

fn guard(account: &Account, trigger: Transition) -> AppResult<VerificationStatus> {
    trigger
        .target(account.verification_status)
        .ok_or(AppError::InvalidState {
            action: trigger.as_str(),
            current: account.verification_status,
        })
}

fn handle_taken() -> AppError {
    AppError::Conflict("This handle is already verified by another account".into())
}
