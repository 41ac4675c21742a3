use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::onboarding::domain::{
    AccountId, RegistrationRequest, ReviewedStatus,
};
use crate::workflows::onboarding::repository::{
    DirectoryError, MailError, Mailer, OutboundEmail, PartnerDirectory, PartnerRecord,
};
use crate::workflows::onboarding::router::onboarding_router;
use crate::workflows::onboarding::service::OnboardingService;
use crate::workflows::onboarding::PartnerStatus;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn registration() -> RegistrationRequest {
    RegistrationRequest {
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: "asha@brokerage.example".to_string(),
        password: "orchid-lane-9".to_string(),
        phone: "9000000001".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        company_name: Some("Rao Realty".to_string()),
        rera_number: Some("MH-RERA-51234".to_string()),
    }
}

pub(super) fn registration_for(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        ..registration()
    }
}

pub(super) fn build_service() -> (
    OnboardingService<MemoryDirectory, MemoryMailer>,
    Arc<MemoryDirectory>,
    Arc<MemoryMailer>,
) {
    let directory = Arc::new(MemoryDirectory::default());
    let mailer = Arc::new(MemoryMailer::default());
    let service = OnboardingService::new(directory.clone(), mailer.clone());
    (service, directory, mailer)
}

pub(super) fn onboarding_router_with_service(
    service: OnboardingService<MemoryDirectory, MemoryMailer>,
) -> axum::Router {
    onboarding_router(Arc::new(service))
}

/// The OTP the service issued for an account, read back from storage the way
/// an email would reveal it to the partner.
pub(super) fn issued_code(directory: &MemoryDirectory, id: &AccountId) -> String {
    directory
        .fetch(id)
        .expect("directory fetch")
        .expect("record present")
        .profile
        .challenge
        .expect("challenge present")
        .code
}

#[derive(Default, Clone)]
pub(super) struct MemoryDirectory {
    records: Arc<Mutex<HashMap<AccountId, PartnerRecord>>>,
}

impl MemoryDirectory {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("directory mutex poisoned").len()
    }
}

impl PartnerDirectory for MemoryDirectory {
    fn create(&self, record: PartnerRecord) -> Result<PartnerRecord, DirectoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        if guard
            .values()
            .any(|existing| existing.account.email == record.account.email)
        {
            return Err(DirectoryError::Conflict);
        }
        guard.insert(record.account.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AccountId) -> Result<Option<PartnerRecord>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, record: PartnerRecord) -> Result<(), DirectoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        if guard.contains_key(&record.account.id) {
            guard.insert(record.account.id.clone(), record);
            Ok(())
        } else {
            Err(DirectoryError::NotFound)
        }
    }

    fn assign_status(
        &self,
        ids: &[AccountId],
        target: ReviewedStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DirectoryError> {
        let mut guard = self.records.lock().expect("directory mutex poisoned");
        let mut count = 0;
        for id in ids {
            if let Some(record) = guard.get_mut(id) {
                record.profile.assign_status(target, at);
                count += 1;
            }
        }
        Ok(count)
    }

    fn pending(&self, limit: usize) -> Result<Vec<PartnerRecord>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        let mut waiting: Vec<PartnerRecord> = guard
            .values()
            .filter(|record| record.profile.status == PartnerStatus::Pending)
            .cloned()
            .collect();
        waiting.sort_by(|a, b| b.account.id.cmp(&a.account.id));
        waiting.truncate(limit);
        Ok(waiting)
    }

    fn roster(&self) -> Result<Vec<PartnerRecord>, DirectoryError> {
        let guard = self.records.lock().expect("directory mutex poisoned");
        let mut all: Vec<PartnerRecord> = guard.values().cloned().collect();
        all.sort_by(|a, b| a.account.id.cmp(&b.account.id));
        Ok(all)
    }
}

/// Directory double where every call fails, for 500-path coverage.
pub(super) struct UnavailableDirectory;

impl PartnerDirectory for UnavailableDirectory {
    fn create(&self, _record: PartnerRecord) -> Result<PartnerRecord, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AccountId) -> Result<Option<PartnerRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: PartnerRecord) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn assign_status(
        &self,
        _ids: &[AccountId],
        _target: ReviewedStatus,
        _at: DateTime<Utc>,
    ) -> Result<usize, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<PartnerRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }

    fn roster(&self) -> Result<Vec<PartnerRecord>, DirectoryError> {
        Err(DirectoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    deliveries: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl MemoryMailer {
    pub(super) fn deliveries(&self) -> Vec<OutboundEmail> {
        self.deliveries.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: OutboundEmail) -> Result<(), MailError> {
        self.deliveries
            .lock()
            .expect("mailer mutex poisoned")
            .push(message);
        Ok(())
    }
}

/// Mailer double whose transport is permanently down.
pub(super) struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _message: OutboundEmail) -> Result<(), MailError> {
        Err(MailError::Transport("smtp relay refused".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
