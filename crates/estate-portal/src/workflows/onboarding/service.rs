use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::credentials::{CredentialError, PasswordVault};
use super::domain::{
    Account, AccountId, AccountRole, BulkAction, ChannelPartnerProfile, EmailChallenge,
    PartnerStatus, RegistrationRequest, ReviewedStatus,
};
use super::repository::{
    DirectoryError, Mailer, OutboundEmail, PartnerDirectory, PartnerRecord,
};

/// Service composing the partner directory, the mail transport, and the
/// password vault into the onboarding workflows.
pub struct OnboardingService<D, M> {
    directory: Arc<D>,
    mailer: Arc<M>,
    vault: PasswordVault,
}

static ACCOUNT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_account_id() -> AccountId {
    let id = ACCOUNT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AccountId(format!("acct-{id:06}"))
}

/// Outcome returned to a freshly registered partner.
#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    pub account_id: AccountId,
    pub message: &'static str,
}

impl<D, M> OnboardingService<D, M>
where
    D: PartnerDirectory + 'static,
    M: Mailer + 'static,
{
    pub fn new(directory: Arc<D>, mailer: Arc<M>) -> Self {
        Self {
            directory,
            mailer,
            vault: PasswordVault::default(),
        }
    }

    /// Register a channel partner: validate, hash the password, create the
    /// account and profile as one atomic unit, then attempt OTP delivery.
    ///
    /// Mail delivery is fire-and-forget by policy: a transport failure is
    /// logged and the registration still succeeds, so a partner can end up
    /// registered with an undelivered code.
    pub fn register(
        &self,
        request: RegistrationRequest,
        now: DateTime<Utc>,
    ) -> Result<RegistrationReceipt, OnboardingError> {
        if let Some(field) = request.missing_field() {
            return Err(OnboardingError::MissingField(field));
        }

        let password_hash = self.vault.hash(&request.password)?;
        let challenge = EmailChallenge::issue(now);

        let account = Account {
            id: next_account_id(),
            name: request.display_name(),
            email: request.email.clone(),
            password_hash,
            role: AccountRole::ChannelPartner,
        };
        let profile = ChannelPartnerProfile {
            first_name: request.first_name,
            last_name: request.last_name,
            company_name: request.company_name,
            phone: request.phone,
            city: request.city,
            state: request.state,
            rera_number: request.rera_number,
            email_verified: false,
            challenge: Some(challenge.clone()),
            status: PartnerStatus::Pending,
            status_stamps: BTreeMap::new(),
        };

        let stored = self
            .directory
            .create(PartnerRecord { account, profile })
            .map_err(|err| match err {
                DirectoryError::Conflict => OnboardingError::DuplicateEmail,
                other => OnboardingError::Directory(other),
            })?;

        if let Err(err) = self.mailer.send(verification_email(&stored.account, &challenge)) {
            warn!(
                account = %stored.account.id.0,
                "verification email not delivered: {err}"
            );
        }

        Ok(RegistrationReceipt {
            account_id: stored.account.id,
            message: "Registration received. Check your email for the verification code.",
        })
    }

    /// Verify email ownership with a submitted code. Equality is checked
    /// before expiry, so a cleared or absent challenge reports an invalid
    /// code rather than an expired one. Success flips the verified flag and
    /// clears the challenge; the approval status is untouched.
    pub fn verify_email(
        &self,
        id: &AccountId,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<PartnerRecord, OnboardingError> {
        let mut record = self
            .directory
            .fetch(id)?
            .ok_or(DirectoryError::NotFound)?;

        match &record.profile.challenge {
            Some(challenge) if challenge.matches(submitted) => {
                if challenge.is_expired(now) {
                    return Err(OnboardingError::OtpExpired);
                }
            }
            _ => return Err(OnboardingError::InvalidOtp),
        }

        record.profile.email_verified = true;
        record.profile.challenge = None;
        self.directory.update(record.clone())?;
        Ok(record)
    }

    /// Apply an administrative status transition to one profile and stamp
    /// the matching timestamp. Transitions are unconditional overwrites.
    pub fn review(
        &self,
        id: &AccountId,
        target: ReviewedStatus,
        now: DateTime<Utc>,
    ) -> Result<PartnerRecord, OnboardingError> {
        let mut record = self
            .directory
            .fetch(id)?
            .ok_or(DirectoryError::NotFound)?;

        record.profile.assign_status(target, now);
        self.directory.update(record.clone())?;
        Ok(record)
    }

    /// Apply the same transition to a batch of profiles, returning how many
    /// records were updated. Per-record effects are identical to [`review`].
    ///
    /// [`review`]: Self::review
    pub fn review_many(
        &self,
        ids: &[AccountId],
        action: BulkAction,
        now: DateTime<Utc>,
    ) -> Result<usize, OnboardingError> {
        if ids.is_empty() {
            return Err(OnboardingError::EmptyBatch);
        }
        let count = self.directory.assign_status(ids, action.target(), now)?;
        Ok(count)
    }

    /// Profiles awaiting review, for the admin queue.
    pub fn pending(&self, limit: usize) -> Result<Vec<PartnerRecord>, OnboardingError> {
        Ok(self.directory.pending(limit)?)
    }

    /// Full directory contents, for the roster export.
    pub fn roster(&self) -> Result<Vec<PartnerRecord>, OnboardingError> {
        Ok(self.directory.roster()?)
    }
}

fn verification_email(account: &Account, challenge: &EmailChallenge) -> OutboundEmail {
    OutboundEmail {
        to: account.email.clone(),
        subject: "Verify your email address".to_string(),
        html_body: format!(
            "<p>Hello {},</p><p>Your verification code is <strong>{}</strong>. \
             It expires in {} minutes.</p>",
            account.name,
            challenge.code,
            EmailChallenge::VALID_MINUTES,
        ),
    }
}

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error("Invalid OTP")]
    InvalidOtp,
    #[error("OTP has expired")]
    OtpExpired,
    #[error("ids must be a non-empty list")]
    EmptyBatch,
    #[error("unrecognized status action: {0}")]
    UnknownAction(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}
