//! Megaverse Agent - brings a candidate's map in line with its goal.
//!
//! Reads the goal and current maps from the Megaverse API, creates every
//! missing or mismatched entity one request at a time, and reports what
//! failed. Safe to re-run: a second pass only retries what is still missing.

use anyhow::{Context, Result};
use clap::Parser;
use megaverse_core::{
    MegaverseClient, MegaverseConfig, PacingPolicy, ReconReport, Reconciler, DEFAULT_BASE_URL,
};
use megaverse_env::TokioContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Megaverse reconciliation agent
#[derive(Parser, Debug)]
#[command(name = "megaverse")]
#[command(about = "Create the entities missing from a Megaverse map", long_about = None)]
struct Args {
    /// Candidate identifier sent with every request
    #[arg(long, env = "MEGAVERSE_CANDIDATE_ID")]
    candidate_id: String,

    /// API root
    #[arg(long, env = "MEGAVERSE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Wait between create requests, in milliseconds
    #[arg(long, env = "MEGAVERSE_INTERVAL_MS", default_value = "3000")]
    interval_ms: u64,

    /// Print the pending operations without creating anything
    #[arg(long)]
    dry_run: bool,

    /// JSON output on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> MegaverseConfig {
        MegaverseConfig::new(self.candidate_id.clone())
            .with_base_url(self.base_url.trim_end_matches('/'))
            .with_pacing(PacingPolicy::every(Duration::from_millis(self.interval_ms)))
    }
}

fn report_json(report: &ReconReport) -> serde_json::Value {
    serde_json::json!({
        "found": report.found,
        "applied": report.applied,
        "failed": report.failed.iter().map(|f| {
            serde_json::json!({
                "row": f.operation.row,
                "column": f.operation.column,
                "target": f.operation.target.to_string(),
                "error": f.error.to_string(),
            })
        }).collect::<Vec<_>>(),
    })
}

async fn run(args: &Args) -> Result<()> {
    let config = args.config();
    let client =
        Arc::new(MegaverseClient::new(&config).context("Failed to build HTTP client")?);
    let reconciler = Reconciler::new(TokioContext::shared(), client.clone(), client)
        .with_pacing(config.pacing);

    if args.dry_run {
        let operations = reconciler.plan().await?;
        if args.json {
            let plan: Vec<_> = operations
                .iter()
                .map(|op| {
                    serde_json::json!({
                        "row": op.row,
                        "column": op.column,
                        "target": op.target.to_string(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            info!("Found {} missing entities to create", operations.len());
            for operation in &operations {
                println!("{}", operation);
            }
        }
        return Ok(());
    }

    let report = reconciler.reconcile().await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report_json(&report))?);
    } else if !report.is_clean() {
        for failed in &report.failed {
            error!("  - {}: {}", failed.operation, failed.error);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the level
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    if let Err(e) = run(&args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use megaverse_core::{FailedOperation, PendingOperation, ReconError};
    use megaverse_env::{AstralObject, EnvError, MapKind, ObjectKind};

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["megaverse", "--candidate-id", "abc"]).unwrap();
        let config = args.config();

        assert_eq!(config.candidate_id, "abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pacing.delay(), Duration::from_secs(3));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::try_parse_from([
            "megaverse",
            "--candidate-id",
            "abc",
            "--base-url",
            "http://localhost:8080/api/",
            "--interval-ms",
            "500",
            "--dry-run",
        ])
        .unwrap();
        let config = args.config();

        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.pacing.delay(), Duration::from_millis(500));
        assert!(args.dry_run);
    }

    #[test]
    fn test_fatal_error_chain_names_cause_once() {
        let err = anyhow::Error::from(ReconError::MapFetch(EnvError::map_fetch(
            MapKind::Goal,
            "boom",
        )));
        assert_eq!(
            format!("{:#}", err),
            "Failed to get maps: Unable to retrieve goal map: boom"
        );
    }

    #[test]
    fn test_report_json_lists_failures() {
        let report = ReconReport {
            found: 2,
            applied: 1,
            failed: vec![FailedOperation {
                operation: PendingOperation {
                    row: 3,
                    column: 4,
                    target: AstralObject::Polyanet,
                },
                error: EnvError::create(ObjectKind::Polyanet, "Request failed with status code 500"),
            }],
        };

        let json = report_json(&report);
        assert_eq!(json["found"], 2);
        assert_eq!(json["failed"][0]["row"], 3);
        assert_eq!(json["failed"][0]["target"], "POLYANET");
    }
}
