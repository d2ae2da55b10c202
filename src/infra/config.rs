use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum_extra::extract::cookie::SameSite;
use env_helpers::get_env_default;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use super::InfraError;

/// Attributes shared by both session cookies.
#[derive(Clone, Debug)]
pub struct CookieSettings {
    pub domain: Option<String>,
    pub secure: bool,
    pub same_site: SameSite,
}

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub admin_username: String,
    pub admin_password: SecretString,
    /// Audience expected in Google id tokens.
    pub google_client_id: String,
    pub database_url: String,
    pub redis_url: String,
    pub bind_addr: SocketAddr,
    /// Base URL of the frontend; reset links point here.
    pub app_origin: Url,
    pub cors_origins: Vec<HeaderValue>,
    pub resend_api_key: SecretString,
    pub email_from: String,
    pub cookie: CookieSettings,
    /// Whether to trust X-Forwarded-For headers. Set to true when behind a reverse proxy.
    /// SECURITY: Only enable this when the API is not directly exposed to the internet.
    pub trust_proxy: bool,
    pub user_session_ttl: Duration,
    pub admin_session_ttl: Duration,
    pub assertion_timeout: std::time::Duration,
    pub password_reset_ttl_minutes: i64,
    pub admin_login_rate_limit_window_secs: u64,
    pub admin_login_rate_limit_max: u64,
}

impl AppConfig {
    /// Loads configuration once at startup. Missing secrets abort the process.
    pub fn from_env() -> Result<Self, InfraError> {
        let jwt_secret = SecretString::new(required("JWT_SECRET")?.into());
        let admin_username = required("ADMIN_USERNAME")?;
        let admin_password = SecretString::new(required("ADMIN_PASSWORD")?.into());
        let google_client_id = required("GOOGLE_CLIENT_ID")?;
        let database_url = required("DATABASE_URL")?;

        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3001)));

        let app_origin_raw: String =
            get_env_default("APP_ORIGIN", "http://localhost:3000".to_string());
        let app_origin = Url::parse(&app_origin_raw).map_err(|e| InfraError::ConfigInvalid {
            var: "APP_ORIGIN",
            reason: e.to_string(),
        })?;
        let cors_origins = parse_origins(&get_env_default(
            "CORS_ORIGINS",
            "http://localhost:3000".to_string(),
        ))?;

        let resend_api_key = SecretString::new(get_env_default("RESEND_API_KEY", String::new()).into());
        let email_from: String =
            get_env_default("EMAIL_FROM", "no-reply@localhost".to_string());

        let cookie_domain: String = get_env_default("COOKIE_DOMAIN", String::new());
        let cookie_secure: bool = get_env_default("COOKIE_SECURE", true);
        let cookie_same_site = parse_same_site(&get_env_default(
            "COOKIE_SAME_SITE",
            "lax".to_string(),
        ))?;

        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let user_session_ttl_days: i64 = get_env_default("USER_SESSION_TTL_DAYS", 7);
        let admin_session_ttl_hours: i64 = get_env_default("ADMIN_SESSION_TTL_HOURS", 24);
        let assertion_timeout_secs: u64 = get_env_default("ASSERTION_TIMEOUT_SECS", 10);
        let password_reset_ttl_minutes: i64 = get_env_default("PASSWORD_RESET_TTL_MINUTES", 60);
        let admin_login_rate_limit_window_secs: u64 =
            get_env_default("ADMIN_LOGIN_RATE_LIMIT_WINDOW_SECS", 900);
        let admin_login_rate_limit_max: u64 = get_env_default("ADMIN_LOGIN_RATE_LIMIT_MAX", 5);

        Ok(Self {
            jwt_secret,
            admin_username,
            admin_password,
            google_client_id,
            database_url,
            redis_url,
            bind_addr,
            app_origin,
            cors_origins,
            resend_api_key,
            email_from,
            cookie: CookieSettings {
                domain: Some(cookie_domain).filter(|d| !d.is_empty()),
                secure: cookie_secure,
                same_site: cookie_same_site,
            },
            trust_proxy,
            user_session_ttl: Duration::days(user_session_ttl_days),
            admin_session_ttl: Duration::hours(admin_session_ttl_hours),
            assertion_timeout: std::time::Duration::from_secs(assertion_timeout_secs),
            password_reset_ttl_minutes,
            admin_login_rate_limit_window_secs,
            admin_login_rate_limit_max,
        })
    }
}

fn required(var: &'static str) -> Result<String, InfraError> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(InfraError::ConfigMissing { var })
}

fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, InfraError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin.parse().map_err(|_| InfraError::ConfigInvalid {
                var: "CORS_ORIGINS",
                reason: format!("{origin:?} is not a valid header value"),
            })
        })
        .collect()
}

fn parse_same_site(raw: &str) -> Result<SameSite, InfraError> {
    match raw.trim().to_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => Ok(SameSite::None),
        other => Err(InfraError::ConfigInvalid {
            var: "COOKIE_SAME_SITE",
            reason: format!("expected lax, strict or none, got {other:?}"),
        }),
    }
}
