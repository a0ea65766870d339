use anyhow::Result;
use clap::Parser;
use std::fs;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gemini_bloggen::cli::{Cli, Command, GenerateArgs, LimitsArgs};
use gemini_bloggen::error::LimitsError;
use gemini_bloggen::limits::RateLimitTable;
use gemini_bloggen::report;
use gemini_bloggen::run::{self, RunOutcome};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Generate(args) => run_generate(&args),
        Command::Limits(args) => run_limits(&args),
    };
    std::process::exit(code);
}

fn run_generate(args: &GenerateArgs) -> i32 {
    match run::execute(args) {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::Written(path) => info!("written: {}", path.display()),
                RunOutcome::SkippedQuota {
                    reason,
                    retry_after_secs,
                } => info!("skipped: {reason} (window resets in {retry_after_secs}s)"),
                RunOutcome::AlreadyExists(path) => {
                    info!("already exists: {}", path.display());
                }
                RunOutcome::Failed(msg) => error!("run failed: {msg}"),
            }
            outcome.exit_code()
        }
        Err(e) => {
            error!("{e:#}");
            exit_code_for(&e)
        }
    }
}

fn run_limits(args: &LimitsArgs) -> i32 {
    match limits_report(args) {
        Ok(text) => match &args.output {
            Some(path) => {
                if let Err(e) = fs::write(path, &text) {
                    error!("write report to {}: {e}", path.display());
                    return 1;
                }
                info!("report written: {}", path.display());
                0
            }
            None => {
                print!("{text}");
                0
            }
        },
        Err(e) => {
            error!("{e:#}");
            exit_code_for(&e)
        }
    }
}

fn limits_report(args: &LimitsArgs) -> Result<String> {
    let table = RateLimitTable::load(args.limits_file.as_deref())?;
    if args.list_categories {
        return Ok(report::render_category_list(&table));
    }
    Ok(report::render_report(
        &table,
        args.format.into(),
        args.model.as_deref(),
        args.category.as_deref(),
    )?)
}

/// Unknown model/category is a usage error (2); everything else is a plain
/// failure (1)
fn exit_code_for(e: &anyhow::Error) -> i32 {
    if e.downcast_ref::<LimitsError>().is_some() {
        2
    } else {
        1
    }
}
