//! Google Sign-In id token verification against Google's published keys.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{ExternalIdentity, IdentityVerifier},
};

const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Google OIDC claims from id_token
#[derive(Debug, Deserialize)]
struct GoogleIdTokenClaims {
    /// Google user ID (stable identifier)
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    /// Authorized party (if present, should match client_id)
    #[serde(default)]
    azp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleJwks {
    keys: Vec<GoogleJwk>,
}

#[derive(Debug, Deserialize)]
struct GoogleJwk {
    kid: String,
    n: String,
    e: String,
}

pub struct GoogleIdentityVerifier {
    client: Client,
    client_id: String,
}

impl GoogleIdentityVerifier {
    pub fn new(client: Client, client_id: String) -> Self {
        Self { client, client_id }
    }

    async fn fetch_jwks(&self) -> AppResult<GoogleJwks> {
        let response = self
            .client
            .get(GOOGLE_JWKS_URL)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to fetch Google JWKs: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Internal("Failed to fetch Google JWKs".into()));
        }

        response
            .json::<GoogleJwks>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Google JWKs: {}", e)))
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify_assertion(&self, raw_assertion: &str) -> AppResult<ExternalIdentity> {
        let header = decode_header(raw_assertion).map_err(|e| {
            tracing::debug!(error = %e, "Invalid id_token header");
            AppError::InvalidAssertion
        })?;
        let kid = header.kid.ok_or(AppError::InvalidAssertion)?;

        let jwks = self.fetch_jwks().await?;
        let jwk = jwks
            .keys
            .iter()
            .find(|k| k.kid == kid)
            .ok_or(AppError::InvalidAssertion)?;
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| AppError::Internal(format!("Failed to create decoding key: {}", e)))?;

        let claims = decode::<GoogleIdTokenClaims>(
            raw_assertion,
            &decoding_key,
            &validation(&self.client_id),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Google id_token rejected");
            AppError::InvalidAssertion
        })?
        .claims;

        to_identity(claims, &self.client_id)
    }
}

fn validation(client_id: &str) -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[client_id]);
    validation.set_issuer(&GOOGLE_ISSUERS);
    validation
}

fn to_identity(claims: GoogleIdTokenClaims, client_id: &str) -> AppResult<ExternalIdentity> {
    if let Some(azp) = &claims.azp
        && azp != client_id
    {
        return Err(AppError::InvalidAssertion);
    }
    if claims.email.trim().is_empty() {
        return Err(AppError::InvalidAssertion);
    }

    let name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| claims.email.clone());
    Ok(ExternalIdentity {
        external_login_id: claims.sub,
        email: claims.email,
        name,
    })
}
