use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::account::{Account, VerificationStatus};

use super::account::{AccountFilter, AccountOrder, AccountRepo, StatusCounts};

/// Operator read models and account removal. Status changes go through
/// `VerificationUseCases`.
#[derive(Clone)]
pub struct AdminUseCases {
    repo: Arc<dyn AccountRepo>,
}

impl AdminUseCases {
    pub fn new(repo: Arc<dyn AccountRepo>) -> Self {
        Self { repo }
    }

    /// Submitted and rejected accounts, most recently touched first.
    #[instrument(skip(self))]
    pub async fn verification_requests(&self) -> AppResult<Vec<Account>> {
        self.repo
            .list(&AccountFilter {
                statuses: vec![VerificationStatus::Submitted, VerificationStatus::Rejected],
                search: None,
                order: AccountOrder::NewestUpdated,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn verified_accounts(&self) -> AppResult<Vec<Account>> {
        self.repo
            .list(&AccountFilter {
                statuses: vec![VerificationStatus::Approved],
                search: None,
                order: AccountOrder::NewestUpdated,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn search_accounts(
        &self,
        status: Option<VerificationStatus>,
        search: Option<&str>,
    ) -> AppResult<Vec<Account>> {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.repo
            .list(&AccountFilter {
                statuses: status.into_iter().collect(),
                search,
                order: AccountOrder::NewestCreated,
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<StatusCounts> {
        self.repo.count_by_status().await
    }

    /// Approved accounts are never deleted.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, account_id: Uuid) -> AppResult<()> {
        if self
            .repo
            .delete_unless(account_id, VerificationStatus::Approved)
            .await?
        {
            tracing::info!(%account_id, "Account deleted");
            return Ok(());
        }

        match self.repo.find_by_id(account_id).await? {
            None => Err(AppError::NotFound),
            Some(account) => Err(AppError::InvalidState {
                action: "delete",
                current: account.verification_status,
            }),
        }
    }
}
