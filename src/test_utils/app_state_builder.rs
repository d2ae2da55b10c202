//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a complete `AppState`
//! backed by in-memory mocks, so the real routers can be driven with `axum-test`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum_extra::extract::cookie::SameSite;
use secrecy::SecretString;
use time::Duration;
use url::Url;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt,
        session::Authenticator,
        use_cases::{
            admin::AdminUseCases,
            auth::{AdminCredentials, AuthUseCases, ExternalIdentity, IdentityVerifier},
            password_reset::PasswordResetUseCases,
            verification::VerificationUseCases,
        },
    },
    domain::entities::{account::Account, role::Role},
    infra::{
        RateLimiterTrait,
        config::{AppConfig, CookieSettings},
    },
    test_utils::{
        InMemoryAccountRepo, InMemoryEmailSender, InMemoryRateLimiter, StubIdentityVerifier,
    },
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-with-enough-entropy";
pub const TEST_ADMIN_USERNAME: &str = "admin";
pub const TEST_ADMIN_PASSWORD: &str = "admin-password";

/// Signed user session for `account_id`, valid for an hour.
pub fn user_session_token(account_id: Uuid) -> String {
    jwt::issue(
        Some(account_id),
        Role::User,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .unwrap()
}

pub fn admin_session_token() -> String {
    jwt::issue(
        None,
        Role::Admin,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .unwrap()
}

pub fn create_test_config() -> AppConfig {
    AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        admin_username: TEST_ADMIN_USERNAME.to_string(),
        admin_password: SecretString::new(TEST_ADMIN_PASSWORD.into()),
        google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
        database_url: "postgres://localhost/test".to_string(),
        redis_url: "redis://localhost:6379".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        app_origin: Url::parse("http://localhost:3000").unwrap(),
        cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
        resend_api_key: SecretString::new(String::new().into()),
        email_from: "no-reply@example.com".to_string(),
        cookie: CookieSettings {
            domain: None,
            secure: false,
            same_site: SameSite::Lax,
        },
        trust_proxy: false,
        user_session_ttl: Duration::days(7),
        admin_session_ttl: Duration::hours(24),
        assertion_timeout: std::time::Duration::from_secs(10),
        password_reset_ttl_minutes: 60,
        admin_login_rate_limit_window_secs: 900,
        admin_login_rate_limit_max: 5,
    }
}

/// In-memory collaborators shared with the built `AppState`, for assertions.
pub struct TestHandles {
    pub repo: Arc<InMemoryAccountRepo>,
    pub email: Arc<InMemoryEmailSender>,
}

/// Builder for creating test AppState with in-memory mocks.
pub struct TestAppStateBuilder {
    accounts: Vec<Account>,
    identity_verifier: Option<Arc<dyn IdentityVerifier>>,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
    config: AppConfig,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            identity_verifier: None,
            rate_limiter: None,
            config: create_test_config(),
        }
    }

    pub fn with_accounts(mut self, accounts: Vec<Account>) -> Self {
        self.accounts.extend(accounts);
        self
    }

    /// Accept every login assertion as `identity`. Without this, logins fail.
    pub fn with_identity(mut self, identity: ExternalIdentity) -> Self {
        self.identity_verifier = Some(Arc::new(StubIdentityVerifier::accepting(identity)));
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    pub fn with_config(mut self, configure: impl FnOnce(&mut AppConfig)) -> Self {
        configure(&mut self.config);
        self
    }

    pub fn build(self) -> (AppState, TestHandles) {
        let repo = Arc::new(InMemoryAccountRepo::with_accounts(self.accounts));
        let email = Arc::new(InMemoryEmailSender::new());
        let verifier: Arc<dyn IdentityVerifier> = self
            .identity_verifier
            .unwrap_or_else(|| Arc::new(StubIdentityVerifier::rejecting()));
        let rate_limiter: Arc<dyn RateLimiterTrait> = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(InMemoryRateLimiter::permissive()));
        let config = self.config;

        let auth_use_cases = AuthUseCases::new(
            repo.clone(),
            verifier,
            config.jwt_secret.clone(),
            AdminCredentials {
                username: config.admin_username.clone(),
                password: config.admin_password.clone(),
            },
        )
        .with_session_ttls(config.user_session_ttl, config.admin_session_ttl)
        .with_assertion_timeout(config.assertion_timeout);

        let password_reset_use_cases = PasswordResetUseCases::new(
            repo.clone(),
            email.clone(),
            config.app_origin.clone(),
            config.password_reset_ttl_minutes,
        );

        let app_state = AppState {
            authenticator: Arc::new(Authenticator::new(config.jwt_secret.clone())),
            auth_use_cases: Arc::new(auth_use_cases),
            verification_use_cases: Arc::new(VerificationUseCases::new(repo.clone())),
            password_reset_use_cases: Arc::new(password_reset_use_cases),
            admin_use_cases: Arc::new(AdminUseCases::new(repo.clone())),
            config: Arc::new(config),
            rate_limiter,
        };

        (app_state, TestHandles { repo, email })
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
