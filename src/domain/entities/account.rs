use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an account's claim on an external competitive-programming handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Unlinked,
    Claimed,
    Submitted,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 5] = [
        VerificationStatus::Unlinked,
        VerificationStatus::Claimed,
        VerificationStatus::Submitted,
        VerificationStatus::Approved,
        VerificationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Unlinked => "UNLINKED",
            VerificationStatus::Claimed => "CLAIMED",
            VerificationStatus::Submitted => "SUBMITTED",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Unlinked
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "UNLINKED" => Ok(VerificationStatus::Unlinked),
            "CLAIMED" => Ok(VerificationStatus::Claimed),
            "SUBMITTED" => Ok(VerificationStatus::Submitted),
            "APPROVED" => Ok(VerificationStatus::Approved),
            "REJECTED" => Ok(VerificationStatus::Rejected),
            _ => Err(format!("Invalid verification status: {}", s)),
        }
    }
}

/// One human principal, created on first external-identity login.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub external_login_id: String,
    pub email: String,
    pub display_name: String,
    pub verification_status: VerificationStatus,
    pub external_handle: Option<String>,
    pub verification_token: Option<String>,
    pub submission_reference: Option<String>,
    pub credential_hash: Option<String>,
    pub credential_set: bool,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    pub fn has_open_reset_window(&self) -> bool {
        self.reset_token_hash.is_some() && self.reset_token_expires_at.is_some()
    }
}

/// Profile attributes taken from a verified identity assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub external_login_id: String,
    pub email: String,
    pub display_name: String,
}
