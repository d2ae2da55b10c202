use std::sync::Arc;

use crate::{
    application::{
        session::Authenticator,
        use_cases::{
            admin::AdminUseCases, auth::AuthUseCases, password_reset::PasswordResetUseCases,
            verification::VerificationUseCases,
        },
    },
    infra::{RateLimiterTrait, config::AppConfig},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub authenticator: Arc<Authenticator>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub verification_use_cases: Arc<VerificationUseCases>,
    pub password_reset_use_cases: Arc<PasswordResetUseCases>,
    pub admin_use_cases: Arc<AdminUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
