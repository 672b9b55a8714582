//! depush - push dependency versions into downstream repositories
//!
//! Reads the known repositories from the configuration file, works out which
//! versions the source repository publishes and rewrites the manifests of
//! every other repository that depends on them.

use clap::Parser;
use depush::cli::CliArgs;
use depush::config::Config;
use depush::error::ConfigError;
use depush::orchestrator::{OrchestratorConfig, PushSourceChanges};
use depush::output::{create_formatter, OutputConfig};
use depush::repository::{discover, extract_git_url};
use depush::telemetry::{init_tracing, level_for};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(args.log_json, level_for(args.verbose, args.quiet));

    // Run the main logic and handle errors
    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    // A working copy wins over an explicit URL
    let clone_url = match (&args.dir, &args.clone_url) {
        (Some(dir), _) => extract_git_url(dir)?,
        (None, Some(url)) => url.clone(),
        (None, None) => return Err(ConfigError::MissingCloneUrl.into()),
    };

    let config = Config::load(&args.config)?;
    let repositories = discover(&config);

    let mut orchestrator_config = OrchestratorConfig::from_settings(config.settings(), args.dry_run);
    if let Some(concurrency) = args.concurrency {
        orchestrator_config.concurrency = concurrency;
    }
    if let Some(timeout) = args.publish_timeout {
        orchestrator_config.publish_timeout = timeout;
    }
    let git_ref = args.git_ref_or(config.settings().default_ref.as_deref());

    if args.verbose {
        eprintln!("depush v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Source: {} at {}", clone_url, git_ref);
        eprintln!("Known repositories: {}", repositories.len());
        if args.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let push = Arc::new(PushSourceChanges::new(
        clone_url,
        git_ref,
        repositories,
        orchestrator_config,
    ));
    let report = push.run_all_with_progress(args.show_progress()).await;

    let mut output_config = OutputConfig::from_cli(args.json, args.verbose, args.quiet);
    output_config.color = io::stdout().is_terminal();
    let formatter = create_formatter(output_config);

    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.has_failures() {
        // Partial success - some targets failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
