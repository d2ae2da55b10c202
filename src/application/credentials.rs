use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::app_error::{AppError, AppResult};

/// Hashes an account password into a PHC string (argon2id, random salt).
pub fn hash_secret(secret: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Runs `hash_secret` on the blocking pool so argon2 does not stall the
/// async workers.
pub async fn hash_secret_async(secret: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_secret(&secret))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
}

/// Returns false for a wrong secret and for an unparseable stored hash.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored credential hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

/// Proof-of-control secret embedded by the user in a public artifact.
pub fn generate_verification_token() -> String {
    random_hex::<16>()
}

/// Raw password-reset secret. Only its digest is ever stored.
pub fn generate_reset_secret() -> String {
    random_hex::<32>()
}

/// Unsalted digest for high-entropy one-time secrets.
pub fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub fn token_matches(raw: &str, stored_hash: &str) -> bool {
    constant_time_compare(&hash_token(raw), stored_hash)
}

pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

fn random_hex<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
