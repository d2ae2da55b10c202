use axum::http::{HeaderMap, header::AUTHORIZATION};
use axum_extra::extract::CookieJar;
use secrecy::SecretString;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::jwt,
    domain::entities::role::Role,
};

pub const USER_SESSION_COOKIE: &str = "user_session";
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// Recovers a raw session token from a request: the named cookie first,
/// then `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct SessionExtractor {
    cookie_name: &'static str,
}

impl SessionExtractor {
    pub fn new(cookie_name: &'static str) -> Self {
        Self { cookie_name }
    }

    pub fn cookie_name(&self) -> &'static str {
        self.cookie_name
    }

    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(self.cookie_name)
            && !cookie.value().is_empty()
        {
            return Some(cookie.value().to_owned());
        }
        bearer_token(headers)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Some((*token).to_owned()),
        _ => None,
    }
}

/// Identity context attached to an authenticated request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject: Option<Uuid>,
    pub role: Role,
}

impl Identity {
    /// Account the caller acts on. Operator sessions carry no account.
    pub fn account_id(&self) -> AppResult<Uuid> {
        self.subject.ok_or(AppError::Forbidden)
    }
}

#[derive(Clone)]
pub struct Authenticator {
    secret: SecretString,
    user: SessionExtractor,
    admin: SessionExtractor,
}

impl Authenticator {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            user: SessionExtractor::new(USER_SESSION_COOKIE),
            admin: SessionExtractor::new(ADMIN_SESSION_COOKIE),
        }
    }

    /// Any valid session passes; admin sessions satisfy user-level checks.
    pub fn authenticate_user(&self, headers: &HeaderMap) -> AppResult<Identity> {
        self.authenticate(&self.user, headers, Role::User)
    }

    pub fn authenticate_admin(&self, headers: &HeaderMap) -> AppResult<Identity> {
        self.authenticate(&self.admin, headers, Role::Admin)
    }

    fn authenticate(
        &self,
        extractor: &SessionExtractor,
        headers: &HeaderMap,
        required: Role,
    ) -> AppResult<Identity> {
        let token = extractor.extract(headers).ok_or(AppError::Unauthenticated)?;
        let claims = jwt::verify(&token, &self.secret)?;
        let subject = claims.subject_id()?;

        if !claims.role.satisfies(required) {
            tracing::warn!(
                role = %claims.role,
                required = %required,
                cookie = extractor.cookie_name(),
                "Session role does not satisfy guard"
            );
            return Err(AppError::Forbidden);
        }

        Ok(Identity {
            subject,
            role: claims.role,
        })
    }
}
