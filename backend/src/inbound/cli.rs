//! Command-line adapter for the waitlist engine.
//!
//! Each command runs against an already started [`WaitlistService`] and
//! renders a [`Report`] either as text lines or as one JSON document.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::SecondsFormat;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::ports::{RegistrationStateRepository, SubmissionGateway};
use crate::domain::{
    DomainError, IncomeRangeCatalogue, Registrant, SignupFields, SubmissionFlow,
    SubmissionOutcome, WaitlistService,
};

/// `subx-waitlist` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "subx-waitlist",
    about = "Join the Subx waitlist and manage referral codes",
    version
)]
pub struct CliArgs {
    /// Directory holding the persisted state. Overrides `SUBX_STORAGE_DIR`.
    #[arg(long = "storage-dir", value_name = "path", global = true)]
    pub storage_dir: Option<PathBuf>,
    /// Print one JSON document instead of text.
    #[arg(long, global = true)]
    pub json: bool,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliArgs {
    /// Output format selected by the flags.
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Waitlist commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Join the waitlist.
    Signup(SignupArgs),
    /// Find the registrant holding a referral code.
    Lookup {
        /// Referral code, for example `SUBX1N7`.
        code: String,
    },
    /// Show the signup counter.
    Count,
    /// Show the current registrant and their invite link.
    Current,
    /// Forget this session's registrants. The signup counter is kept.
    Reset,
    /// List the income brackets the signup form accepts.
    IncomeRanges,
}

/// Signup form fields.
#[derive(Debug, Clone, Args)]
pub struct SignupArgs {
    /// Full name.
    #[arg(long = "full-name", value_name = "name")]
    pub full_name: String,
    /// Contact email address.
    #[arg(long, value_name = "address")]
    pub email: String,
    /// Phone number with 10 to 15 digits.
    #[arg(long = "phone-number", value_name = "number")]
    pub phone_number: String,
    /// Income bracket identifier. Defaults to the form's preselected bracket.
    #[arg(long = "income-range", value_name = "id")]
    pub income_range: Option<String>,
}

impl SignupArgs {
    /// Raw form fields, filling the income range from the catalogue default.
    pub fn to_fields(&self, catalogue: &IncomeRangeCatalogue) -> SignupFields {
        let income_range = self.income_range.clone().unwrap_or_else(|| {
            catalogue
                .default_selection()
                .map(|option| option.value().to_owned())
                .unwrap_or_default()
        });
        SignupFields {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            income_range,
        }
    }
}

/// How command results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// A single pretty-printed JSON document.
    Json,
}

/// Whether a command did what was asked.
#[derive(Debug)]
pub enum RunOutcome {
    /// The command completed.
    Completed,
    /// The command was refused; the error has already been reported.
    Rejected(DomainError),
}

impl RunOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Completed => ExitCode::SUCCESS,
            Self::Rejected(_) => ExitCode::FAILURE,
        }
    }
}

/// Rendered command output.
struct Report {
    lines: Vec<String>,
    document: Value,
}

impl Report {
    fn write_to<W: Write>(&self, out: &mut W, format: OutputFormat) -> io::Result<()> {
        match format {
            OutputFormat::Text => {
                for line in &self.lines {
                    writeln!(out, "{line}")?;
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, &self.document)
                    .map_err(io::Error::other)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> io::Result<Value> {
    serde_json::to_value(value).map_err(io::Error::other)
}

/// Render `count` with thousands separators, e.g. `137,583`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

/// Run `command` and write its report to `out`.
pub async fn run<R, G, W>(
    command: &Command,
    format: OutputFormat,
    service: &mut WaitlistService<R>,
    flow: &mut SubmissionFlow<G>,
    out: &mut W,
) -> io::Result<RunOutcome>
where
    R: RegistrationStateRepository,
    G: SubmissionGateway,
    W: Write,
{
    let (report, outcome) = match command {
        Command::Signup(args) => signup(args, service, flow).await?,
        Command::Lookup { code } => lookup(code, service)?,
        Command::Count => (count(service), RunOutcome::Completed),
        Command::Current => (current(service)?, RunOutcome::Completed),
        Command::Reset => (reset(service).await, RunOutcome::Completed),
        Command::IncomeRanges => (income_ranges(service.catalogue()), RunOutcome::Completed),
    };
    report.write_to(out, format)?;
    Ok(outcome)
}

fn rejection(error: DomainError) -> io::Result<(Report, RunOutcome)> {
    let mut lines = vec![format!("error: {}", error.message())];
    if let Some(Value::Object(details)) = error.details() {
        lines.extend(details.iter().map(|(key, value)| {
            let value = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_owned);
            format!("  {key}: {value}")
        }));
    }
    let report = Report {
        lines,
        document: json!({ "error": to_json(&error)? }),
    };
    Ok((report, RunOutcome::Rejected(error)))
}

fn registrant_lines(registrant: &Registrant, catalogue: &IncomeRangeCatalogue) -> Vec<String> {
    let income_range = registrant.income_range().as_ref();
    vec![
        format!("Name: {}", registrant.full_name()),
        format!("Email: {}", registrant.email()),
        format!("Phone: {}", registrant.phone_number()),
        format!(
            "Income range: {}",
            catalogue.label_for(income_range).unwrap_or(income_range)
        ),
        format!("Referral code: {}", registrant.referral_code()),
        format!(
            "Joined: {}",
            registrant
                .date_joined()
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
    ]
}

async fn signup<R, G>(
    args: &SignupArgs,
    service: &mut WaitlistService<R>,
    flow: &mut SubmissionFlow<G>,
) -> io::Result<(Report, RunOutcome)>
where
    R: RegistrationStateRepository,
    G: SubmissionGateway,
{
    let fields = args.to_fields(service.catalogue());
    let committed = match flow.submit(service, &fields).await {
        SubmissionOutcome::Invalid(errors) => return rejection(DomainError::validation(&errors)),
        SubmissionOutcome::Failed { message, error } => {
            return rejection(
                DomainError::submission(message).with_details(json!({ "cause": error.to_string() })),
            );
        }
        SubmissionOutcome::Registered(committed) => committed,
    };

    let persistence_error = committed.persistence_error().map(DomainError::from);
    let registrant = committed.into_value();
    let link = service.referral_link_for(registrant.referral_code());
    let signup_count = service.signup_count();

    let mut lines = vec![format!(
        "Welcome to the Subx waitlist, {}!",
        registrant.full_name()
    )];
    lines.extend(registrant_lines(&registrant, service.catalogue()));
    lines.push(format!("Referral link: {link}"));
    lines.push(format!("Share: {}", link.share_message()));
    lines.push(format!(
        "{} people have joined the waitlist.",
        format_count(signup_count)
    ));
    if let Some(error) = &persistence_error {
        lines.push(format!("warning: {error}"));
    }

    let document = json!({
        "registrant": to_json(&registrant)?,
        "referralLink": link.as_ref(),
        "shareMessage": link.share_message(),
        "signupCount": signup_count,
        "persistenceError": persistence_error.as_ref().map(DomainError::message),
    });
    Ok((Report { lines, document }, RunOutcome::Completed))
}

fn lookup<R>(code: &str, service: &WaitlistService<R>) -> io::Result<(Report, RunOutcome)> {
    let Some(registrant) = service.get_by_referral_code(code) else {
        return rejection(DomainError::not_found(format!(
            "no registrant holds referral code {code}"
        )));
    };
    let link = service.referral_link_for(registrant.referral_code());

    let mut lines = registrant_lines(registrant, service.catalogue());
    lines.push(format!("Referral link: {link}"));
    let document = json!({
        "registrant": to_json(registrant)?,
        "referralLink": link.as_ref(),
    });
    Ok((Report { lines, document }, RunOutcome::Completed))
}

fn count<R>(service: &WaitlistService<R>) -> Report {
    let signup_count = service.signup_count();
    Report {
        lines: vec![format!(
            "{} people have joined the waitlist.",
            format_count(signup_count)
        )],
        document: json!({ "signupCount": signup_count }),
    }
}

fn current<R>(service: &WaitlistService<R>) -> io::Result<Report> {
    let (Some(registrant), Some(link)) = (service.active_registrant(), service.referral_link())
    else {
        return Ok(Report {
            lines: vec!["No one has signed up in this session yet.".to_owned()],
            document: json!({
                "registrant": null,
                "referralLink": null,
                "shareMessage": null,
            }),
        });
    };

    let mut lines = registrant_lines(registrant, service.catalogue());
    lines.push(format!("Referral link: {link}"));
    lines.push(format!("Share: {}", link.share_message()));
    Ok(Report {
        lines,
        document: json!({
            "registrant": to_json(registrant)?,
            "referralLink": link.as_ref(),
            "shareMessage": link.share_message(),
        }),
    })
}

async fn reset<R>(service: &mut WaitlistService<R>) -> Report
where
    R: RegistrationStateRepository,
{
    let cleared = service.registrants().len();
    let committed = service.reset().await;
    let persistence_error = committed.persistence_error().map(DomainError::from);
    let signup_count = service.signup_count();

    let mut lines = vec![format!(
        "Cleared {cleared} registrant(s). The signup counter stays at {}.",
        format_count(signup_count)
    )];
    if let Some(error) = &persistence_error {
        lines.push(format!("warning: {error}"));
    }
    Report {
        lines,
        document: json!({
            "cleared": cleared,
            "signupCount": signup_count,
            "persistenceError": persistence_error.as_ref().map(DomainError::message),
        }),
    }
}

fn income_ranges(catalogue: &IncomeRangeCatalogue) -> Report {
    let default_value = catalogue.default_selection().map(|option| option.value());
    let mut lines = Vec::new();
    let mut entries = Vec::new();
    for option in catalogue.iter() {
        let is_default = Some(option.value()) == default_value;
        let marker = if is_default { " (default)" } else { "" };
        lines.push(format!("{}\t{}{marker}", option.value(), option.label()));
        entries.push(json!({
            "value": option.value(),
            "label": option.label(),
            "default": is_default,
        }));
    }
    Report {
        lines,
        document: json!({ "incomeRanges": entries }),
    }
}
