//! Command-line front end for the contact form pipeline
//!
//! - `courier submit` runs one contact form through validation, the store
//!   and the relay, then prints what the visitor would be told
//! - `courier list` prints every stored submission

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use courier::{
    Courier, SubmissionOutcome,
    config::{PASSWORD_ENV, find_config_file},
};
use courier_common::{ContactForm, ContactPreference, SubjectCategory, Submission, Timeline, logging};

#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Record contact form submissions and notify the site owner", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (otherwise COURIER_CONFIG, ./courier.config.ron,
    /// then /etc/courier/courier.config.ron)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a contact form
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        company: String,
        /// One of the form's categories, e.g. "Job Opportunity" or job-opportunity
        #[arg(long, default_value_t = SubjectCategory::GeneralInquiry)]
        subject: SubjectCategory,
        /// Subject text when --subject is "Other"
        #[arg(long)]
        custom_subject: Option<String>,
        /// email, phone or either
        #[arg(long, default_value_t = ContactPreference::Email)]
        contact_preference: ContactPreference,
        /// low, medium or high
        #[arg(long, default_value_t = Timeline::Low)]
        timeline: Timeline,
    },
    /// List stored submissions, oldest first
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Courier> {
    let path = match path {
        Some(path) => path,
        None => find_config_file()?,
    };

    Ok(Courier::load(&path)?.with_password(std::env::var(PASSWORD_ENV).ok()))
}

fn print_submission(submission: &Submission) {
    println!("{}", submission.timestamp().to_rfc3339());
    println!("  From:     {} <{}>", submission.name(), submission.email());
    if !submission.company().is_empty() {
        println!("  Company:  {}", submission.company());
    }
    if !submission.phone().is_empty() {
        println!("  Phone:    {}", submission.phone());
    }
    println!("  Subject:  {}", submission.subject());
    println!(
        "  Contact:  {} / {}",
        submission.contact_preference(),
        submission.timeline()
    );
    println!("  Message:  {}", submission.message());
    println!();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    logging::init();

    let courier = load_config(cli.config)?;
    let fallback = courier.fallback_contact().to_string();
    let controller = courier.into_controller().await?;

    match cli.command {
        Commands::Submit {
            name,
            email,
            message,
            phone,
            company,
            subject,
            custom_subject,
            contact_preference,
            timeline,
        } => {
            let form = ContactForm {
                name,
                email,
                phone,
                company,
                subject,
                custom_subject,
                message,
                contact_preference,
                timeline,
            };

            let outcome = controller.submit(form).await;
            println!("{}", outcome.user_message(&fallback));

            Ok(match outcome {
                SubmissionOutcome::Delivered(_) => ExitCode::SUCCESS,
                SubmissionOutcome::Failed(_) => ExitCode::from(1),
                SubmissionOutcome::Rejected(_) => ExitCode::from(2),
                SubmissionOutcome::StoredOnly(_) => ExitCode::from(3),
            })
        }
        Commands::List { format } => {
            let submissions = controller.store().list().await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&submissions)?),
                OutputFormat::Text if submissions.is_empty() => println!("No submissions stored"),
                OutputFormat::Text => submissions.iter().for_each(print_submission),
            }

            Ok(ExitCode::SUCCESS)
        }
    }
}
