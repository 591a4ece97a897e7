//! `mailtriage` - rule-driven email triage against a JMAP store.
//!
//! One invocation is one batch run: evaluate the configured rules over the
//! scan folder, apply the label mutations in a single batched call, and
//! merge the observed senders into the two ledger files.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailtriage_core::{TriageConfig, credentials, run_triage};

/// Picks the config path from `--config <path>`, falling back to the
/// default location.
fn config_path() -> anyhow::Result<PathBuf> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("--config") => {
            let path = args.next().context("--config requires a path")?;
            Ok(PathBuf::from(path))
        }
        Some(other) => anyhow::bail!("unknown argument: {other}"),
        None => Ok(TriageConfig::default_path()),
    }
}

async fn run() -> anyhow::Result<()> {
    let path = config_path()?;
    let config = TriageConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    let token = credentials::api_token(&config.account)?;

    info!(server = %config.server_url, folder = %config.scan_folder, "starting triage run");
    let client = mailtriage_jmap::Client::connect(&config.server_url, &token).await?;
    let summary = run_triage(&client, &config).await?;
    info!(
        scanned = summary.scanned,
        modified = summary.modified,
        kept_added = summary.kept_added,
        excluded_added = summary.excluded_added,
        "done"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailtriage=debug,mailtriage_core=debug,mailtriage_jmap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("triage run failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
