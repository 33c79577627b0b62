//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves configuration (flags, environment, defaults) once
//! - sets up logging
//! - loads the dashboard and prints it, or hands off to the TUI

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FetchArgs, ShowArgs, SourceArgs};
use crate::config::{DataConfig, EnvSettings};
use crate::data::DataFetcher;
use crate::domain::Dataset;
use crate::error::{AppError, EXIT_DATA};

pub mod pipeline;

/// Where the TUI writes its log.
pub const TUI_LOG_FILE: &str = "fitdash.log";

/// Entry point for the `fitdash` binary.
pub fn run() -> Result<(), AppError> {
    // We want `fitdash` and `fitdash -u 18` to behave like `fitdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let env = EnvSettings::from_env();

    match cli.command {
        Command::Show(args) => {
            crate::logging::init_stderr();
            handle_show(args, &env)
        }
        Command::Fetch(args) => {
            crate::logging::init_stderr();
            handle_fetch(args, &env)
        }
        Command::Tui(args) => {
            crate::logging::init_file(Path::new(TUI_LOG_FILE))?;
            handle_tui(args, &env)
        }
    }
}

fn resolve(args: &SourceArgs, env: &EnvSettings) -> Result<DataConfig, AppError> {
    let config = crate::config::resolve(args, env)?;
    info!(user = %config.user, source = ?config.source, policy = ?config.stale_policy, "configuration resolved");
    Ok(config)
}

fn handle_show(args: ShowArgs, env: &EnvSettings) -> Result<(), AppError> {
    let config = resolve(&args.source, env)?;
    let fetcher = Arc::new(DataFetcher::from_config(&config)?);
    let source_label = fetcher.source().label();

    let state = pipeline::load_dashboard(fetcher, &config)?;
    println!(
        "{}",
        crate::report::format_dashboard(&state, source_label, args.width, args.height)
    );

    // Partial failures are shown inline; only a fully failed dashboard is an error.
    if state.all_failed() {
        if let Some(err) = state.profile.error() {
            return Err(err.clone().into());
        }
    }
    Ok(())
}

fn handle_fetch(args: FetchArgs, env: &EnvSettings) -> Result<(), AppError> {
    let config = resolve(&args.source, env)?;
    let fetcher = DataFetcher::from_config(&config)?;
    let dataset = fetcher.dataset(args.kind, config.user)?;
    println!("{}", encode_dataset(&dataset, args.pretty)?);
    Ok(())
}

/// JSON for `fitdash fetch`: the bare normalized record, no wrapper.
fn encode_dataset(dataset: &Dataset, pretty: bool) -> Result<String, AppError> {
    if pretty {
        serde_json::to_string_pretty(dataset)
    } else {
        serde_json::to_string(dataset)
    }
    .map_err(|e| AppError::new(EXIT_DATA, format!("Failed to encode {}: {e}", dataset.kind())))
}

fn handle_tui(args: SourceArgs, env: &EnvSettings) -> Result<(), AppError> {
    let config = resolve(&args, env)?;
    crate::tui::run(config)
}

/// Rewrite argv so `fitdash` defaults to `fitdash tui`.
///
/// Rules:
/// - `fitdash`                      -> `fitdash tui`
/// - `fitdash -u 18 ...`            -> `fitdash tui -u 18 ...`
/// - `fitdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "fetch" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
