//! Channel-partner onboarding: registration with email OTP verification and
//! the administrative approval lifecycle.
//!
//! The workflow is three request-scoped orchestrations over one directory
//! record: register (validate, hash, atomic account+profile create, OTP
//! issue, best-effort mail), verify (code match, expiry check, clear), and
//! review (unconditional status transitions, singly or in bulk).

pub mod credentials;
pub mod domain;
pub mod export;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use credentials::{CredentialError, PasswordVault};
pub use domain::{
    Account, AccountId, AccountRole, BulkAction, ChannelPartnerProfile, EmailChallenge,
    PartnerStatus, RegistrationRequest, ReviewedStatus,
};
pub use export::{roster_csv, ExportError};
pub use repository::{
    DirectoryError, MailError, Mailer, OutboundEmail, PartnerDirectory, PartnerRecord,
    PartnerView,
};
pub use router::onboarding_router;
pub use service::{OnboardingError, OnboardingService, RegistrationReceipt};
