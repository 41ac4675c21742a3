use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use estate_portal::workflows::onboarding::{
    AccountId, DirectoryError, MailError, Mailer, OutboundEmail, PartnerDirectory, PartnerRecord,
    PartnerStatus, ReviewedStatus,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Single-process partner directory. A relational database sits here in the
/// deployed portal; the map-and-mutex version keeps the service runnable
/// standalone and honors the same atomicity contract (create holds the lock
/// across the uniqueness check and the insert).
#[derive(Default, Clone)]
pub(crate) struct InMemoryPartnerDirectory {
    records: Arc<Mutex<HashMap<AccountId, PartnerRecord>>>,
}

impl PartnerDirectory for InMemoryPartnerDirectory {
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

/// Mail transport that logs instead of relaying. The deployed portal plugs
/// an SMTP provider into the same seam.
#[derive(Clone)]
pub(crate) struct ConsoleMailer {
    from_address: String,
}

impl ConsoleMailer {
    pub(crate) fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

impl Mailer for ConsoleMailer {
    fn send(&self, message: OutboundEmail) -> Result<(), MailError> {
        info!(
            from = %self.from_address,
            to = %message.to,
            subject = %message.subject,
            "outbound email (console transport)"
        );
        Ok(())
    }
}
