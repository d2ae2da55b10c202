use serde::Serialize;

use super::account::VerificationStatus;

/// Every trigger that may move an account through its verification lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Claim,
    Submit,
    Approve,
    Reject,
    Revoke,
    ResetVerification,
    Delink,
    SetCredential,
    ChangeCredential,
}

use Transition::*;
use VerificationStatus::*;

/// (from, trigger, to). A pair missing from this table is an illegal transition.
const TRANSITIONS: &[(VerificationStatus, Transition, VerificationStatus)] = &[
    (Unlinked, Claim, Claimed),
    (Claimed, Submit, Submitted),
    (Submitted, Approve, Approved),
    (Submitted, Reject, Rejected),
    (Approved, Revoke, Rejected),
    (Rejected, ResetVerification, Unlinked),
    (Unlinked, Delink, Unlinked),
    (Claimed, Delink, Unlinked),
    (Submitted, Delink, Unlinked),
    (Rejected, Delink, Unlinked),
    (Approved, SetCredential, Approved),
    (Approved, ChangeCredential, Approved),
];

impl Transition {
    pub const ALL: [Transition; 9] = [
        Claim,
        Submit,
        Approve,
        Reject,
        Revoke,
        ResetVerification,
        Delink,
        SetCredential,
        ChangeCredential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Claim => "claim",
            Submit => "submit",
            Approve => "approve",
            Reject => "reject",
            Revoke => "revoke",
            ResetVerification => "reset_verification",
            Delink => "delink",
            SetCredential => "set_credential",
            ChangeCredential => "change_credential",
        }
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(self, Approve | Reject | Revoke)
    }

    /// Resulting status when this trigger fires from `from`, or `None` if illegal.
    pub fn target(self, from: VerificationStatus) -> Option<VerificationStatus> {
        TRANSITIONS
            .iter()
            .find(|(state, trigger, _)| *state == from && *trigger == self)
            .map(|(_, _, to)| *to)
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
