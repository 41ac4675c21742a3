use super::repository::PartnerRecord;
use chrono::{DateTime, Utc};

const ROSTER_HEADER: [&str; 13] = [
    "Account ID",
    "Name",
    "Email",
    "Company",
    "Phone",
    "City",
    "State",
    "RERA Number",
    "Email Verified",
    "Status",
    "Approved At",
    "Rejected At",
    "Suspended At",
];

/// Render the partner roster as an RFC-4180 CSV document. Quoting of commas
/// and embedded quotes is delegated to the `csv` writer.
pub fn roster_csv(records: &[PartnerRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(ROSTER_HEADER)?;

    for record in records {
        let view = record.partner_view();
        writer.write_record([
            view.account_id.0.as_str(),
            view.name.as_str(),
            view.email.as_str(),
            view.company_name.as_deref().unwrap_or(""),
            view.phone.as_str(),
            view.city.as_str(),
            view.state.as_str(),
            view.rera_number.as_deref().unwrap_or(""),
            if view.email_verified { "yes" } else { "no" },
            view.status,
            timestamp_cell(view.approved_at).as_str(),
            timestamp_cell(view.rejected_at).as_str(),
            timestamp_cell(view.suspended_at).as_str(),
        ])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| ExportError::Buffer(err.to_string()))
}

fn timestamp_cell(value: Option<DateTime<Utc>>) -> String {
    value.map(|at| at.to_rfc3339()).unwrap_or_default()
}

/// Error raised while rendering the roster export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv rendering failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(String),
}

#[cfg(test)]
mod tests {
    use super::super::domain::{
        Account, AccountId, AccountRole, ChannelPartnerProfile, PartnerStatus, ReviewedStatus,
    };
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn record(company: Option<&str>) -> PartnerRecord {
        let mut profile = ChannelPartnerProfile {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            company_name: company.map(str::to_string),
            phone: "9000000001".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            rera_number: None,
            email_verified: true,
            challenge: None,
            status: PartnerStatus::Pending,
            status_stamps: BTreeMap::new(),
        };
        profile.assign_status(
            ReviewedStatus::Approved,
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        );

        PartnerRecord {
            account: Account {
                id: AccountId("acct-000042".to_string()),
                name: "Asha Rao".to_string(),
                email: "asha@brokerage.example".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                role: AccountRole::ChannelPartner,
            },
            profile,
        }
    }

    #[test]
    fn roster_includes_header_and_joined_fields() {
        let csv = roster_csv(&[record(Some("Rao Realty"))]).expect("renders");
        let mut lines = csv.lines();

        let header = lines.next().expect("header row");
        assert!(header.starts_with("Account ID,Name,Email,Company"));
        assert!(header.ends_with("Suspended At"));

        let row = lines.next().expect("data row");
        assert!(row.contains("acct-000042"));
        assert!(row.contains("asha@brokerage.example"));
        assert!(row.contains("APPROVED"));
        assert!(row.contains("2026-03-01T09:30:00+00:00"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = roster_csv(&[record(Some("Rao, Kulkarni & Co"))]).expect("renders");
        assert!(csv.contains("\"Rao, Kulkarni & Co\""));
    }

    #[test]
    fn empty_roster_is_header_only() {
        let csv = roster_csv(&[]).expect("renders");
        assert_eq!(csv.lines().count(), 1);
    }
}
