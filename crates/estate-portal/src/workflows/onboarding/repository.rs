use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Account, AccountId, ChannelPartnerProfile, PartnerStatus, ReviewedStatus};

/// Directory record pairing an account with its partner profile. The two are
/// created together and never exist apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub account: Account,
    pub profile: ChannelPartnerProfile,
}

impl PartnerRecord {
    /// Admin-facing view joining profile fields with the account identity.
    pub fn partner_view(&self) -> PartnerView {
        PartnerView {
            account_id: self.account.id.clone(),
            name: self.account.name.clone(),
            email: self.account.email.clone(),
            company_name: self.profile.company_name.clone(),
            phone: self.profile.phone.clone(),
            city: self.profile.city.clone(),
            state: self.profile.state.clone(),
            rera_number: self.profile.rera_number.clone(),
            email_verified: self.profile.email_verified,
            status: self.profile.status.label(),
            approved_at: self.profile.stamped_at(PartnerStatus::Approved),
            rejected_at: self.profile.stamped_at(PartnerStatus::Rejected),
            suspended_at: self.profile.stamped_at(PartnerStatus::Suspended),
        }
    }
}

/// Storage abstraction over the partner directory so the workflow can be
/// exercised against in-memory doubles.
pub trait PartnerDirectory: Send + Sync {
    /// Persist account and profile as one atomic unit. Fails with
    /// [`DirectoryError::Conflict`] when the email is already taken; on any
    /// failure neither record is observable afterwards.
    fn create(&self, record: PartnerRecord) -> Result<PartnerRecord, DirectoryError>;

    fn fetch(&self, id: &AccountId) -> Result<Option<PartnerRecord>, DirectoryError>;

    fn update(&self, record: PartnerRecord) -> Result<(), DirectoryError>;

    /// Apply the same status transition to every identified profile in one
    /// batch, returning how many records matched. Unknown identifiers are
    /// skipped, mirroring a relational `UPDATE ... WHERE id IN (...)`.
    fn assign_status(
        &self,
        ids: &[AccountId],
        target: ReviewedStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DirectoryError>;

    /// Profiles still awaiting review, newest account first.
    fn pending(&self, limit: usize) -> Result<Vec<PartnerRecord>, DirectoryError>;

    /// Every record in the directory, ordered by account id.
    fn roster(&self) -> Result<Vec<PartnerRecord>, DirectoryError>;
}

/// Error enumeration for directory failures.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("an account with this email already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// Outbound transactional mail handed to the transport. The sender address
/// is the transport's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Trait describing the mail transport seam (SMTP relay, API provider, or a
/// recording double in tests).
pub trait Mailer: Send + Sync {
    fn send(&self, message: OutboundEmail) -> Result<(), MailError>;
}

/// Mail dispatch error. Always catchable; the registration workflow logs it
/// and carries on.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

/// Serialized shape of a partner as exposed to the admin back office.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerView {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub phone: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rera_number: Option<String>,
    pub email_verified: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,
}
