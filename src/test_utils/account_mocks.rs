//! In-memory mock implementation of the account store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::account::{
        AccountFilter, AccountMutation, AccountOrder, AccountRepo, Patch, StatusCounts,
    },
    domain::entities::account::{Account, NewAccount, VerificationStatus},
};

/// In-memory implementation of AccountRepo for testing.
///
/// Every call holds the map lock for its whole body, so a conditional update
/// (guard, uniqueness check and write) is atomic like the SQL statement.
#[derive(Default)]
pub struct InMemoryAccountRepo {
    pub accounts: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial accounts for testing.
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let map: HashMap<Uuid, Account> = accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Mutex::new(map),
        }
    }

    /// Get one account (for test assertions).
    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.lock().unwrap().get(&id).cloned()
    }

    /// Get all accounts (for test assertions).
    pub fn get_all(&self) -> Vec<Account> {
        self.accounts.lock().unwrap().values().cloned().collect()
    }
}

fn same_handle(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.to_lowercase() == b.to_lowercase())
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.get(id))
    }

    async fn find_by_external_login_id(
        &self,
        external_login_id: &str,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.external_login_id == external_login_id)
            .cloned())
    }

    async fn find_by_handle(
        &self,
        handle: &str,
        status: VerificationStatus,
    ) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.verification_status == status && same_handle(a.external_handle.as_deref(), handle))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let email = email.to_lowercase();
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.email.to_lowercase() == email)
            .min_by_key(|a| a.created_at)
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts
            .values()
            .any(|a| a.external_login_id == account.external_login_id)
        {
            return Err(AppError::Conflict("Account already exists".into()));
        }

        let now = chrono::Utc::now().naive_utc();
        let created = Account {
            id: Uuid::new_v4(),
            external_login_id: account.external_login_id,
            email: account.email,
            display_name: account.display_name,
            verification_status: VerificationStatus::Unlinked,
            external_handle: None,
            verification_token: None,
            submission_reference: None,
            credential_hash: None,
            credential_set: false,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn conditional_update(
        &self,
        id: Uuid,
        expected: VerificationStatus,
        mutation: AccountMutation,
    ) -> AppResult<Option<Account>> {
        let mut accounts = self.accounts.lock().unwrap();

        let mut updated = match accounts.get(&id) {
            Some(account) if account.verification_status == expected => account.clone(),
            _ => return Ok(None),
        };
        mutation.apply(&mut updated, chrono::Utc::now().naive_utc());

        if updated.verification_status == VerificationStatus::Approved
            && let Some(handle) = updated.external_handle.as_deref()
            && accounts.values().any(|other| {
                other.id != id
                    && other.verification_status == VerificationStatus::Approved
                    && same_handle(other.external_handle.as_deref(), handle)
            })
        {
            return Err(AppError::Conflict("Handle already approved".into()));
        }

        accounts.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn consume_reset(
        &self,
        id: Uuid,
        expected_reset_hash: &str,
        credential_hash: String,
        now: NaiveDateTime,
    ) -> AppResult<Option<Account>> {
        let mut accounts = self.accounts.lock().unwrap();

        let Some(account) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        let window_open = account.verification_status == VerificationStatus::Approved
            && account.reset_token_hash.as_deref() == Some(expected_reset_hash)
            && account.reset_token_expires_at.is_some_and(|expires| expires > now);
        if !window_open {
            return Ok(None);
        }

        AccountMutation {
            credential_hash: Patch::Set(credential_hash),
            reset_token_hash: Patch::Clear,
            reset_token_expires_at: Patch::Clear,
            ..Default::default()
        }
        .apply(account, chrono::Utc::now().naive_utc());
        Ok(Some(account.clone()))
    }

    async fn refresh_profile(
        &self,
        id: Uuid,
        email: &str,
        display_name: &str,
    ) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&id).ok_or(AppError::NotFound)?;

        account.email = email.to_string();
        account.display_name = display_name.to_string();
        account.updated_at = chrono::Utc::now().naive_utc();

        Ok(account.clone())
    }

    async fn delete_unless(&self, id: Uuid, protected: VerificationStatus) -> AppResult<bool> {
        let mut accounts = self.accounts.lock().unwrap();
        match accounts.get(&id) {
            Some(account) if account.verification_status != protected => {
                accounts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_by_status(&self) -> AppResult<StatusCounts> {
        let accounts = self.accounts.lock().unwrap();
        let mut counts = StatusCounts::default();
        for account in accounts.values() {
            counts.add(account.verification_status, 1);
            if account.credential_set {
                counts.with_credential += 1;
            }
        }
        Ok(counts)
    }

    async fn list(&self, filter: &AccountFilter) -> AppResult<Vec<Account>> {
        let mut found: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        match filter.order {
            AccountOrder::NewestUpdated => found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            AccountOrder::NewestCreated => found.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(found)
    }
}
