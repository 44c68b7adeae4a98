//! `subx-waitlist` entry point: wires configuration, file-backed state, and
//! the simulated submission gateway into the CLI.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use subx_backend::config::WaitlistSettings;
use subx_backend::domain::{SubmissionFlow, WaitlistService};
use subx_backend::inbound::cli::{self, CliArgs};
use subx_backend::outbound::persistence::{
    FileKeyValueStore, KeyValueRegistrationStateRepository,
};
use subx_backend::outbound::submission::SimulatedSubmissionGateway;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build Tokio runtime")?;
    runtime.block_on(async_main(args))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn async_main(args: CliArgs) -> Result<ExitCode> {
    // Flags are parsed by clap above; settings only read env and config files.
    let settings = WaitlistSettings::load_from_iter([OsString::from("subx-waitlist")])
        .map_err(|error| eyre!("failed to load configuration: {error}"))?;
    let options = settings
        .waitlist_options()
        .wrap_err("invalid waitlist configuration")?;

    let storage_dir = args
        .storage_dir
        .clone()
        .unwrap_or_else(|| settings.storage_dir());
    let store = FileKeyValueStore::open(&storage_dir)
        .wrap_err_with(|| format!("failed to open storage at {}", storage_dir.display()))?;
    let repository = Arc::new(KeyValueRegistrationStateRepository::new(store));

    let mut service = WaitlistService::start(repository, Arc::new(DefaultClock), options).await;
    let gateway = SimulatedSubmissionGateway::new(settings.submission_delay());
    let mut flow = SubmissionFlow::new(Arc::new(gateway));

    let mut stdout = io::stdout().lock();
    let outcome = cli::run(
        &args.command,
        args.output_format(),
        &mut service,
        &mut flow,
        &mut stdout,
    )
    .await
    .wrap_err("failed to write command output")?;
    Ok(outcome.exit_code())
}
