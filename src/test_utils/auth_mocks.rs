//! In-memory mocks for the login, email and rate-limit collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        auth::{ExternalIdentity, IdentityVerifier},
        password_reset::EmailSender,
    },
    infra::RateLimiterTrait,
};

// ============================================================================
// StubIdentityVerifier
// ============================================================================

/// Identity verifier that accepts or rejects every assertion.
pub struct StubIdentityVerifier {
    identity: Option<ExternalIdentity>,
    delay: Option<Duration>,
}

impl StubIdentityVerifier {
    pub fn accepting(identity: ExternalIdentity) -> Self {
        Self {
            identity: Some(identity),
            delay: None,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            identity: None,
            delay: None,
        }
    }

    /// Accepts, but only after `delay` (pair with a paused clock).
    pub fn slow(identity: ExternalIdentity, delay: Duration) -> Self {
        Self {
            identity: Some(identity),
            delay: Some(delay),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StubIdentityVerifier {
    async fn verify_assertion(&self, _raw_assertion: &str) -> AppResult<ExternalIdentity> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.identity.clone().ok_or(AppError::InvalidAssertion)
    }
}

// ============================================================================
// InMemoryEmailSender
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email sender that records every message instead of delivering it.
#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<SentEmail>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured_emails(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// In-memory rate limiter for testing.
/// Uses HashMap to track request counts per key.
pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(u64::MAX)
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("rate:admin-login:{ip}")).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}
