use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use time::Duration;
use tracing::instrument;

use crate::app_error::{AppError, AppResult};
use crate::application::{credentials, jwt};
use crate::domain::entities::{
    account::{Account, NewAccount},
    role::Role,
};

use super::account::AccountRepo;

/// Profile attributes proven by a third-party identity assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub external_login_id: String,
    pub email: String,
    pub name: String,
}

/// Validates a federated login assertion (signature, audience, freshness).
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify_assertion(&self, raw_assertion: &str) -> AppResult<ExternalIdentity>;
}

/// Operator credential pair. Administrators are not accounts.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
}

/// A freshly signed session token and the lifetime the transport should use.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub max_age: Duration,
}

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn AccountRepo>,
    verifier: Arc<dyn IdentityVerifier>,
    jwt_secret: SecretString,
    admin: AdminCredentials,
    user_session_ttl: Duration,
    admin_session_ttl: Duration,
    assertion_timeout: std::time::Duration,
}

impl AuthUseCases {
    pub fn new(
        repo: Arc<dyn AccountRepo>,
        verifier: Arc<dyn IdentityVerifier>,
        jwt_secret: SecretString,
        admin: AdminCredentials,
    ) -> Self {
        Self {
            repo,
            verifier,
            jwt_secret,
            admin,
            user_session_ttl: Duration::days(7),
            admin_session_ttl: Duration::hours(24),
            assertion_timeout: std::time::Duration::from_secs(10),
        }
    }

    pub fn with_session_ttls(mut self, user: Duration, admin: Duration) -> Self {
        self.user_session_ttl = user;
        self.admin_session_ttl = admin;
        self
    }

    pub fn with_assertion_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.assertion_timeout = timeout;
        self
    }

    /// Verifies the assertion, finds or creates the account and issues a
    /// user session.
    #[instrument(skip(self, raw_assertion))]
    pub async fn login(&self, raw_assertion: &str) -> AppResult<(Account, SessionGrant)> {
        if raw_assertion.trim().is_empty() {
            return Err(AppError::InvalidInput("Token is required".into()));
        }

        let identity = match tokio::time::timeout(
            self.assertion_timeout,
            self.verifier.verify_assertion(raw_assertion),
        )
        .await
        {
            Ok(Ok(identity)) => identity,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Identity assertion rejected");
                return Err(AppError::InvalidAssertion);
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.assertion_timeout.as_millis() as u64,
                    "Identity assertion verification timed out"
                );
                return Err(AppError::InvalidAssertion);
            }
        };

        let account = self.find_or_create(&identity).await?;
        let token = jwt::issue(
            Some(account.id),
            Role::User,
            &self.jwt_secret,
            self.user_session_ttl,
        )?;

        tracing::info!(account_id = %account.id, "User logged in");
        Ok((
            account,
            SessionGrant {
                token,
                max_age: self.user_session_ttl,
            },
        ))
    }

    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, username: &str, password: &str) -> AppResult<SessionGrant> {
        // Both comparisons always run.
        let username_ok = credentials::constant_time_compare(username, &self.admin.username);
        let password_ok =
            credentials::constant_time_compare(password, self.admin.password.expose_secret());
        if !(username_ok & password_ok) {
            tracing::warn!("Admin login failed");
            return Err(AppError::InvalidCredentials);
        }

        let token = jwt::issue(None, Role::Admin, &self.jwt_secret, self.admin_session_ttl)?;
        tracing::info!("Admin logged in");
        Ok(SessionGrant {
            token,
            max_age: self.admin_session_ttl,
        })
    }

    async fn find_or_create(&self, identity: &ExternalIdentity) -> AppResult<Account> {
        if let Some(existing) = self
            .repo
            .find_by_external_login_id(&identity.external_login_id)
            .await?
        {
            if existing.email == identity.email && existing.display_name == identity.name {
                return Ok(existing);
            }
            return self
                .repo
                .refresh_profile(existing.id, &identity.email, &identity.name)
                .await;
        }

        let new_account = NewAccount {
            external_login_id: identity.external_login_id.clone(),
            email: identity.email.clone(),
            display_name: identity.name.clone(),
        };
        match self.repo.create(new_account).await {
            Ok(created) => {
                tracing::info!(account_id = %created.id, "Account created on first login");
                Ok(created)
            }
            // A concurrent first login won the insert.
            Err(AppError::Conflict(_)) => self
                .repo
                .find_by_external_login_id(&identity.external_login_id)
                .await?
                .ok_or_else(|| AppError::Internal("Account vanished after conflict".into())),
            Err(e) => Err(e),
        }
    }
}
