mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use tfdrift::inspect::{InspectorRegistry, ProviderClient, RetryPolicy};
use tfdrift::scan::{ScanEngine, ScanOptions, run_scan};
use tfdrift::{Severity, output, terraform};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let state = terraform::read_state_file(&cli.statefile)?;
    tracing::info!(
        count = state.resources.len(),
        terraform_version = %state.terraform_version,
        "declared state loaded"
    );

    let client = ProviderClient::new(cli.token.clone(), cli.endpoint.clone())?;
    let engine = Arc::new(ScanEngine::new(InspectorRegistry::with_defaults(client)));
    let options = ScanOptions {
        concurrency: cli.concurrency,
        timeout: cli.timeout.map(Duration::from_secs),
        retry: RetryPolicy::default(),
    };

    let outcome = run_scan(state.resources, engine, &options).await?;

    match cli.format {
        OutputFormat::Table => {
            println!("{}", output::records_table(&outcome.records));
            println!();
            println!("{}", output::summary_block(&outcome.summary, outcome.incomplete));

            let fixes = output::collect_fixes(&outcome.records);
            if !fixes.is_empty() && cli.fix_out.is_none() {
                println!();
                for fix in &fixes {
                    println!("{}", fix.snippet);
                    println!();
                }
            }
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "records": outcome.records,
                "summary": outcome.summary,
                "incomplete": outcome.incomplete,
                "fixes": output::collect_fixes(&outcome.records),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if let Some(path) = &cli.fix_out {
        output::write_fixes_file(path, &outcome.records)?;
        tracing::info!(path = %path.display(), "fix suggestions written");
    }

    let threshold: Severity = cli.fail_on.into();
    if outcome.summary.max_severity() >= threshold {
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}
