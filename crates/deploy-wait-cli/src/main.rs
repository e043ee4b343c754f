//! deploy-wait - wait for the deployment of the triggering commit
//!
//! Runs as a GitHub Actions step. Reads the triggering event, polls the
//! repository's deployments for its commit and publishes the deployment URL
//! as the `url` output, or fails the step.
//!
//! ## Inputs
//!
//! Action inputs arrive as `INPUT_*` variables (`token`, `environment`,
//! `timeout`, `app`); the event and repository come from the standard
//! `GITHUB_*` variables. Every value can also be passed as a flag.

mod actions;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use deploy_wait_core::{
    init_tracing, report, report_error, wait_for_deployment, EventKind, RepositoryRef,
    ResolutionOutcome, ResultSink, WaitInputs,
};
use deploy_wait_github::{GithubClient, GithubConfig, DEFAULT_API_URL};
use serde_json::Value;
use tracing::{debug, error, Level};

use crate::actions::ActionsSink;

#[derive(Parser, Debug)]
#[command(name = "deploy-wait")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wait for a GitHub deployment of the triggering commit", long_about = None)]
struct Cli {
    /// Token used to read deployments
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: String,

    /// Deployment environment to narrow the lookup to
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    environment: Option<String>,

    /// Seconds to wait before giving up
    #[arg(long, env = "INPUT_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Only consider deployments whose payload names this app
    #[arg(long, env = "INPUT_APP")]
    app: Option<String>,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: String,

    /// Path to the triggering event's JSON payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: RepositoryRef,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// File step outputs are appended to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Collect the run inputs. The event payload is only read for events
    /// that can name a commit.
    fn wait_inputs(&self) -> Result<WaitInputs> {
        let event = EventKind::from(self.event_name.as_str());
        let payload = if event.is_supported() {
            load_event_payload(self.event_path.as_deref())?
        } else {
            Value::Null
        };

        Ok(WaitInputs {
            event,
            payload,
            repository: self.repository.clone(),
            app: self.app.clone(),
            environment: self.environment.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }
}

fn load_event_payload(path: Option<&Path>) -> Result<Value> {
    let path = path.context("GITHUB_EVENT_PATH is not set")?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Event payload {} is not valid JSON", path.display()))
}

async fn run(cli: &Cli) -> Result<ResolutionOutcome> {
    let inputs = cli.wait_inputs()?;
    let client = GithubClient::new(GithubConfig::new(&cli.token).with_api_url(&cli.api_url))
        .context("Failed to create GitHub client")?;
    debug!(config = ?client.config(), "GitHub client ready");

    let outcome = wait_for_deployment(&client, &inputs).await?;
    Ok(outcome)
}

/// Report an unusable configuration as a failed step. Help and version
/// requests are not failures and go through clap's own output.
fn report_config_error(sink: &mut dyn ResultSink, err: &clap::Error) -> ExitCode {
    use clap::error::ErrorKind;

    let _ = err.print();
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return ExitCode::SUCCESS;
    }

    let message = err.to_string().trim_end().to_string();
    if let Err(write_err) = report_error(sink, &message) {
        eprintln!("Failed to write step result: {}", write_err);
    }
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return report_config_error(&mut ActionsSink::new(None), &err),
    };

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let mut sink = ActionsSink::new(cli.output_file.clone());
    let reported = match run(&cli).await {
        Ok(outcome) => report(&mut sink, &outcome),
        Err(err) => report_error(&mut sink, &format!("{:#}", err)).map(|_| false),
    };

    match reported {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("Failed to write step result: {}", err);
            ExitCode::FAILURE
        }
    }
}
