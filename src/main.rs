use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use registry_spray_rs::config::{self, EngineConfig, Scheme};
use registry_spray_rs::engine::Engine;
use registry_spray_rs::inputs::{self, CredentialPlan};
use registry_spray_rs::output;
use registry_spray_rs::report::{self, Status, StatusReporter};
use registry_spray_rs::types::{Credential, RunResults, Target};

/// registry-spray-rs — parallel credential auditor for Docker registries.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "registry-spray-rs",
    version,
    about = "Tries credentials against Docker registry /v2 endpoints and reports valid logins and open registries.",
    long_about = None
)]
struct Cli {
    /// Target registries (host[:port]), comma separated or a file with one per line.
    #[arg(short = 't', long = "target")]
    target: String,

    /// Users, comma separated or a file with one per line. Omit to look for anonymous access.
    #[arg(short = 'u', long)]
    users: Option<String>,

    /// Passwords, comma separated or a file with one per line.
    #[arg(short = 'P', long = "password")]
    password: Option<String>,

    /// File of `user:password` lines (overrides --users/--password).
    #[arg(short = 'c', long)]
    credentials: Option<String>,

    /// Fetch each open registry's catalog and write it as JSON to this path.
    #[arg(short = 'd', long)]
    details: Option<PathBuf>,

    /// Per-request timeout in seconds (fractions allowed). No timeout if omitted.
    #[arg(short = 'T', long)]
    timeout: Option<f64>,

    /// CSV file for successful logins (default: "<date> <time>.csv").
    #[arg(short = 'w', long)]
    write: Option<PathBuf>,

    /// Number of parallel workers, 1 to 1024 (default: number of CPUs).
    #[arg(long)]
    workers: Option<usize>,

    /// Scheme used to reach the registries.
    #[arg(long, value_enum, default_value_t = Scheme::Http)]
    scheme: Scheme,

    /// Disable coloured output.
    #[arg(long = "no-color", default_value_t = false)]
    no_color: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    report::init_local_offset();
    tokio::runtime::Runtime::new()?.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<ExitCode> {
    init_tracing();

    let color = !cli.no_color && console::colors_enabled();
    let reporter = Arc::new(StatusReporter::stdout(color));

    let (targets, credentials, config) = match prepare(&cli, &reporter) {
        Ok(v) => v,
        Err(e) => {
            reporter.notice(Status::Bad, &format!("{e:#}"));
            return Ok(ExitCode::FAILURE);
        }
    };

    reporter.notice(Status::Good, &format!("Total Target Servers = {}", targets.len()));
    reporter.notice(Status::Good, &format!("Total Credentials    = {}", credentials.len()));
    reporter.notice(Status::Info, &format!("Starting {} Workers", config.workers));

    let engine = Engine::http(config, reporter.clone())?;
    let results = engine.run(targets.into(), credentials.into()).await?;

    print_summary(&reporter, &results);
    persist(&cli, &reporter, &results)?;
    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "registry_spray_rs=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load lists and turn the CLI flags into an engine configuration.
fn prepare(
    cli: &Cli,
    reporter: &StatusReporter,
) -> Result<(Vec<Target>, Vec<Credential>, EngineConfig)> {
    let targets = inputs::load_targets(&cli.target)?;

    let plan = inputs::plan_credentials(
        cli.credentials.as_deref(),
        cli.users.as_deref(),
        cli.password.as_deref(),
    )?;
    match &plan {
        CredentialPlan::Anonymous => {
            reporter.notice(Status::Warn, "No USER Specified");
            reporter.notice(Status::Info, "Trying to Find Unauthorized Access");
        }
        CredentialPlan::Combined { users, passwords, .. } => {
            reporter.notice(Status::Info, &format!("Users Loaded = {users}"));
            reporter.notice(Status::Info, &format!("Passwords Loaded = {passwords}"));
        }
        CredentialPlan::File(creds) => {
            reporter.notice(Status::Info, &format!("Credentials Loaded = {}", creds.len()));
        }
    }

    let timeout = cli.timeout.map(config::timeout_from_secs).transpose()?;
    let config = EngineConfig {
        scheme: cli.scheme,
        timeout,
        capture_details: cli.details.is_some(),
        workers: match cli.workers {
            Some(n) => config::check_workers(n)?,
            None => config::default_workers(),
        },
    };
    Ok((targets, plan.into_credentials(), config))
}

fn print_summary(reporter: &StatusReporter, results: &RunResults) {
    reporter.notice(
        Status::Info,
        &format!("Successful Logins = {}", results.successes.len()),
    );
    reporter.notice(
        Status::Info,
        &format!("Total Attempts    = {}", results.stats.attempts),
    );
    reporter.notice(
        Status::Info,
        &format!(
            "Denied / Errors   = {} / {}",
            results.stats.denied, results.stats.errors
        ),
    );
    reporter.notice(
        Status::Info,
        &format!("Time Taken        = {:.2} seconds", results.elapsed.as_secs_f64()),
    );
    reporter.notice(
        Status::Info,
        &format!("Rate              = {:.2} logins / seconds", results.rate()),
    );
}

fn persist(cli: &Cli, reporter: &StatusReporter, results: &RunResults) -> Result<()> {
    if results.successes.is_empty() {
        return Ok(());
    }
    let csv = cli.write.clone().unwrap_or_else(output::default_csv_path);
    reporter.notice(
        Status::Info,
        &format!("Dumping Successful Logins to File {}", csv.display()),
    );
    output::write_csv_file(&csv, &results.successes)?;

    if let Some(path) = cli.details.as_deref() {
        reporter.notice(
            Status::Info,
            &format!("Dumping Details to File {}", path.display()),
        );
        output::write_details_json(path, &results.successes)?;
    }
    Ok(())
}
