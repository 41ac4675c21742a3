use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for portal accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub String);

/// Role tag carried by every account. Exactly one role at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    Admin,
    ChannelPartner,
    Visitor,
}

/// Login identity stored alongside the partner profile. Email is globally
/// unique, compared exactly as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AccountRole,
}

/// Administrative approval state of a channel partner, independent of email
/// verification. Starts at Pending; only admin action moves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartnerStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl PartnerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PartnerStatus::Pending => "PENDING",
            PartnerStatus::Approved => "APPROVED",
            PartnerStatus::Rejected => "REJECTED",
            PartnerStatus::Suspended => "SUSPENDED",
        }
    }
}

/// Statuses an admin review can assign. Pending is deliberately absent: no
/// route re-opens a reviewed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewedStatus {
    Approved,
    Rejected,
    Suspended,
}

impl ReviewedStatus {
    /// Wire values are compared as strings, matching the admin contract.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "SUSPENDED" => Some(Self::Suspended),
            _ => None,
        }
    }

    pub const fn status(self) -> PartnerStatus {
        match self {
            ReviewedStatus::Approved => PartnerStatus::Approved,
            ReviewedStatus::Rejected => PartnerStatus::Rejected,
            ReviewedStatus::Suspended => PartnerStatus::Suspended,
        }
    }
}

/// Verbs accepted by the bulk status endpoint, mapped 1:1 onto
/// [`ReviewedStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Approve,
    Reject,
    Suspend,
}

impl BulkAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            "suspend" => Some(Self::Suspend),
            _ => None,
        }
    }

    pub const fn target(self) -> ReviewedStatus {
        match self {
            BulkAction::Approve => ReviewedStatus::Approved,
            BulkAction::Reject => ReviewedStatus::Rejected,
            BulkAction::Suspend => ReviewedStatus::Suspended,
        }
    }
}

/// A pending email-ownership challenge. Code and expiry always travel
/// together; a verified profile carries no challenge at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailChallenge {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl EmailChallenge {
    /// Codes stay valid for ten minutes after issuance.
    pub const VALID_MINUTES: i64 = 10;

    /// Draw a fresh 6-digit code, uniform over [100000, 999999]. The lower
    /// bound keeps leading zeros out by construction. The thread RNG is not
    /// a CSPRNG; codes are short-lived and single-use.
    pub fn issue(now: DateTime<Utc>) -> Self {
        let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        Self {
            code: code.to_string(),
            expires_at: now + Duration::minutes(Self::VALID_MINUTES),
        }
    }

    pub fn matches(&self, submitted: &str) -> bool {
        self.code == submitted
    }

    /// Strict comparison: a code submitted at the exact expiry instant still
    /// counts as live.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Channel-partner profile, one per account of role `ChannelPartner`,
/// created in the same transaction as its account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPartnerProfile {
    pub first_name: String,
    pub last_name: String,
    pub company_name: Option<String>,
    pub phone: String,
    pub city: String,
    pub state: String,
    pub rera_number: Option<String>,
    pub email_verified: bool,
    pub challenge: Option<EmailChallenge>,
    pub status: PartnerStatus,
    /// Timestamp per reviewed status, stamped when the transition happens.
    /// Earlier stamps survive later transitions, so a profile moved through
    /// Approved then Suspended retains both.
    pub status_stamps: BTreeMap<PartnerStatus, DateTime<Utc>>,
}

impl ChannelPartnerProfile {
    /// Unconditional overwrite: any current status may move to any reviewed
    /// status, and repeating a transition just re-stamps its timestamp.
    pub fn assign_status(&mut self, target: ReviewedStatus, at: DateTime<Utc>) {
        self.status = target.status();
        self.status_stamps.insert(target.status(), at);
    }

    pub fn stamped_at(&self, status: PartnerStatus) -> Option<DateTime<Utc>> {
        self.status_stamps.get(&status).copied()
    }
}

/// Registration payload accepted from the public site. Required fields are
/// defaulted so an absent field reports the same validation error as an
/// empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub rera_number: Option<String>,
}

impl RegistrationRequest {
    /// First required field that is missing or blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("password", &self.password),
            ("phone", &self.phone),
            ("city", &self.city),
            ("state", &self.state),
        ];
        required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}
