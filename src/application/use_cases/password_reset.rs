use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use url::Url;

use crate::app_error::{AppError, AppResult};
use crate::application::{credentials, validators};
use crate::domain::entities::account::VerificationStatus;

use super::account::{AccountMutation, AccountRepo, Patch};

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PasswordResetUseCases {
    repo: Arc<dyn AccountRepo>,
    email: Arc<dyn EmailSender>,
    app_origin: Url,
    reset_ttl: chrono::Duration,
}

impl PasswordResetUseCases {
    pub fn new(
        repo: Arc<dyn AccountRepo>,
        email: Arc<dyn EmailSender>,
        app_origin: Url,
        reset_ttl_minutes: i64,
    ) -> Self {
        Self {
            repo,
            email,
            app_origin,
            reset_ttl: chrono::Duration::minutes(reset_ttl_minutes.max(1)),
        }
    }

    /// Opens a reset window and mails the raw secret. Unknown addresses
    /// succeed silently so the endpoint is not an account oracle.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let email = email.trim();
        if !validators::is_valid_email(email) {
            return Err(AppError::InvalidInput("Valid email is required".into()));
        }

        let Some(account) = self.repo.find_by_email(email).await? else {
            tracing::debug!("Password reset requested for unknown email");
            return Ok(());
        };
        if account.verification_status != VerificationStatus::Approved {
            return Err(AppError::MustBeVerified);
        }

        let raw = credentials::generate_reset_secret();
        let expires_at = chrono::Utc::now().naive_utc() + self.reset_ttl;
        let mutation = AccountMutation {
            reset_token_hash: Patch::Set(credentials::hash_token(&raw)),
            reset_token_expires_at: Patch::Set(expires_at),
            ..Default::default()
        };
        self.repo
            .conditional_update(account.id, VerificationStatus::Approved, mutation)
            .await?
            .ok_or(AppError::MustBeVerified)?;

        let link = self.reset_link(&raw, &account.email)?;
        self.email
            .send(
                &account.email,
                "Reset your password",
                &format!(
                    "<p>Use the link below to choose a new password. It expires in {} minutes.</p>\
                     <p><a href=\"{link}\">Reset password</a></p>",
                    self.reset_ttl.num_minutes()
                ),
            )
            .await?;

        tracing::info!(account_id = %account.id, "Password reset link sent");
        Ok(())
    }

    #[instrument(skip(self, raw_secret, new_password))]
    pub async fn complete_reset(
        &self,
        email: &str,
        raw_secret: &str,
        new_password: &str,
    ) -> AppResult<()> {
        validators::validate_password(new_password)?;

        let account = self
            .repo
            .find_by_email(email.trim())
            .await?
            .ok_or(AppError::InvalidResetToken)?;

        let (Some(stored_hash), Some(expires_at)) = (
            account.reset_token_hash.as_deref(),
            account.reset_token_expires_at,
        ) else {
            return Err(AppError::Expired);
        };
        if expires_at <= chrono::Utc::now().naive_utc() {
            return Err(AppError::Expired);
        }
        if raw_secret.is_empty() || !credentials::token_matches(raw_secret, stored_hash) {
            tracing::warn!(account_id = %account.id, "Reset secret mismatch");
            return Err(AppError::InvalidResetToken);
        }
        if account.verification_status != VerificationStatus::Approved {
            return Err(AppError::MustBeVerified);
        }

        let credential_hash = credentials::hash_secret_async(new_password.to_owned()).await?;
        // The store re-checks the window, so a secret that another request
        // consumed or replaced since the read above is refused here.
        self.repo
            .consume_reset(
                account.id,
                stored_hash,
                credential_hash,
                chrono::Utc::now().naive_utc(),
            )
            .await?
            .ok_or(AppError::Expired)?;

        tracing::info!(account_id = %account.id, "Password reset completed");
        Ok(())
    }

    fn reset_link(&self, raw: &str, email: &str) -> AppResult<String> {
        let mut link = self
            .app_origin
            .join("reset-password")
            .map_err(|e| AppError::Internal(format!("Invalid APP_ORIGIN: {e}")))?;
        link.query_pairs_mut()
            .append_pair("token", raw)
            .append_pair("email", email);
        Ok(link.to_string())
    }
}
