use crate::{
    adapters::{
        email::resend::ResendEmailSender, http::app_state::AppState,
        identity::google::GoogleIdentityVerifier,
    },
    application::{
        session::Authenticator,
        use_cases::{
            account::AccountRepo,
            admin::AdminUseCases,
            auth::{AdminCredentials, AuthUseCases},
            password_reset::PasswordResetUseCases,
            verification::VerificationUseCases,
        },
    },
    infra::{
        InfraError, config::AppConfig, http_client::try_build_client, postgres_persistence,
        rate_limit::RedisRateLimiter,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> Result<AppState, InfraError> {
    let config = AppConfig::from_env()?;

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let account_repo = postgres_arc as Arc<dyn AccountRepo>;

    let rate_limiter = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.admin_login_rate_limit_window_secs,
            config.admin_login_rate_limit_max,
        )
        .await?,
    );

    let http = try_build_client().map_err(InfraError::HttpClient)?;
    let email = Arc::new(ResendEmailSender::new(
        http.clone(),
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));
    let identity_verifier = Arc::new(GoogleIdentityVerifier::new(
        http,
        config.google_client_id.clone(),
    ));

    let auth_use_cases = AuthUseCases::new(
        account_repo.clone(),
        identity_verifier,
        config.jwt_secret.clone(),
        AdminCredentials {
            username: config.admin_username.clone(),
            password: config.admin_password.clone(),
        },
    )
    .with_session_ttls(config.user_session_ttl, config.admin_session_ttl)
    .with_assertion_timeout(config.assertion_timeout);

    let password_reset_use_cases = PasswordResetUseCases::new(
        account_repo.clone(),
        email,
        config.app_origin.clone(),
        config.password_reset_ttl_minutes,
    );

    Ok(AppState {
        authenticator: Arc::new(Authenticator::new(config.jwt_secret.clone())),
        auth_use_cases: Arc::new(auth_use_cases),
        verification_use_cases: Arc::new(VerificationUseCases::new(account_repo.clone())),
        password_reset_use_cases: Arc::new(password_reset_use_cases),
        admin_use_cases: Arc::new(AdminUseCases::new(account_repo)),
        config: Arc::new(config),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "handle_verify=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs); skipped when the file cannot be created.
    let json_layer = File::create("app.log").ok().map(|file| {
        fmt::layer()
            .json()
            .with_writer(file)
            .with_current_span(true)
            .with_span_list(true)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
