use crate::infra::{ConsoleMailer, InMemoryPartnerDirectory};
use chrono::Utc;
use clap::Args;
use estate_portal::error::AppError;
use estate_portal::workflows::onboarding::{
    roster_csv, AccountId, BulkAction, OnboardingService, PartnerDirectory, RegistrationRequest,
    ReviewedStatus,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Write the final roster CSV to this path instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Skip the bulk status portion of the demo
    #[arg(long)]
    pub(crate) skip_bulk: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { output, skip_bulk } = args;

    let directory = Arc::new(InMemoryPartnerDirectory::default());
    let mailer = Arc::new(ConsoleMailer::new(
        "no-reply@estateportal.example".to_string(),
    ));
    let service = OnboardingService::new(directory.clone(), mailer);

    println!("Channel-partner onboarding demo");

    let now = Utc::now();
    let partners = [
        ("Asha", "Rao", "asha@brokerage.example", Some("Rao Realty")),
        ("Vikram", "Shah", "vikram@brokerage.example", None),
        ("Meera", "Iyer", "meera@estates.example", Some("Iyer Estates")),
    ];

    let mut ids: Vec<AccountId> = Vec::new();
    println!("\nRegistrations");
    for (first, last, email, company) in partners {
        let request = RegistrationRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            password: "demo-passphrase-1".to_string(),
            phone: "9000000001".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            company_name: company.map(str::to_string),
            rera_number: None,
        };
        match service.register(request, now) {
            Ok(receipt) => {
                println!("- {email} -> {} ({})", receipt.account_id.0, receipt.message);
                ids.push(receipt.account_id);
            }
            Err(err) => {
                println!("- {email} rejected: {err}");
                return Ok(());
            }
        }
    }

    println!("\nEmail verification");
    let code = match directory.fetch(&ids[0]) {
        Ok(Some(record)) => record
            .profile
            .challenge
            .map(|challenge| challenge.code)
            .unwrap_or_default(),
        _ => String::new(),
    };
    match service.verify_email(&ids[0], &code, now) {
        Ok(record) => println!(
            "- {} verified with code {code} -> emailVerified={}",
            record.account.email, record.profile.email_verified
        ),
        Err(err) => println!("- verification failed: {err}"),
    }

    println!("\nAdmin review");
    match service.review(&ids[0], ReviewedStatus::Approved, Utc::now()) {
        Ok(record) => println!(
            "- {} -> {}",
            record.account.email,
            record.profile.status.label()
        ),
        Err(err) => println!("- approval failed: {err}"),
    }
    match service.review(&ids[1], ReviewedStatus::Rejected, Utc::now()) {
        Ok(record) => println!(
            "- {} -> {}",
            record.account.email,
            record.profile.status.label()
        ),
        Err(err) => println!("- rejection failed: {err}"),
    }

    if !skip_bulk {
        println!("\nBulk update");
        match service.review_many(&ids[1..], BulkAction::Suspend, Utc::now()) {
            Ok(count) => println!("- suspended {count} partners in one batch"),
            Err(err) => println!("- bulk update failed: {err}"),
        }
    }

    let pending = match service.pending(10) {
        Ok(pending) => pending,
        Err(err) => {
            println!("\nPending queue unavailable: {err}");
            return Ok(());
        }
    };
    println!("\nPending queue: {} partner(s)", pending.len());
    for record in &pending {
        println!("- {} ({})", record.account.name, record.account.email);
    }

    let roster = match service.roster() {
        Ok(roster) => roster,
        Err(err) => {
            println!("\nRoster unavailable: {err}");
            return Ok(());
        }
    };
    let document = roster_csv(&roster)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &document)?;
            println!("\nRoster CSV written to {}", path.display());
        }
        None => {
            println!("\nRoster CSV");
            print!("{document}");
        }
    }

    Ok(())
}
