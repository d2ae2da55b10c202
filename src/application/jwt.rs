use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::role::Role;

/// Payload of a signed session token. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id; absent for operator (admin) sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn subject_id(&self) -> AppResult<Option<Uuid>> {
        self.sub
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|_| AppError::InvalidToken)
    }
}

pub fn issue(
    subject: Option<Uuid>,
    role: Role,
    secret: &SecretString,
    ttl: Duration,
) -> AppResult<String> {
    issue_at(
        subject,
        role,
        secret,
        ttl,
        OffsetDateTime::now_utc().unix_timestamp(),
    )
}

pub fn issue_at(
    subject: Option<Uuid>,
    role: Role,
    secret: &SecretString,
    ttl: Duration,
    now: i64,
) -> AppResult<String> {
    let claims = SessionClaims {
        sub: subject.map(|id| id.to_string()),
        role,
        iat: now,
        exp: now + ttl.whole_seconds(),
    };
    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify(token: &str, secret: &SecretString) -> AppResult<SessionClaims> {
    verify_at(token, secret, OffsetDateTime::now_utc().unix_timestamp())
}

/// Checks signature and expiry against `now`. Any defect yields `InvalidToken`
/// and no claims.
pub fn verify_at(token: &str, secret: &SecretString, now: i64) -> AppResult<SessionClaims> {
    // Expiry is checked below against the caller's clock, with no leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(reason = %e, "Session token rejected");
        AppError::InvalidToken
    })?;

    if claims.exp <= now {
        tracing::debug!(exp = claims.exp, now, "Session token expired");
        return Err(AppError::InvalidToken);
    }

    Ok(claims)
}
