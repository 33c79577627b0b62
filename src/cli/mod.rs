//! Command-line parsing for the fitness dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from data loading and rendering.

use clap::{Args, Parser, Subcommand};

use crate::data::StalePolicy;
use crate::domain::{DatasetKind, UserId};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "fitdash",
    version,
    about = "Terminal fitness dashboard (REST backend or bundled mock data)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the whole dashboard as text: greeting, charts, score, nutrition.
    Show(ShowArgs),
    /// Print one normalized dataset as JSON (useful for scripting).
    Fetch(FetchArgs),
    /// Launch the interactive dashboard.
    ///
    /// Loads the same datasets as `fitdash show`, in the background, and
    /// renders them with Ratatui. Left/right switches user.
    Tui(SourceArgs),
}

/// Where data comes from and for whom.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// User id to display (defaults to 12).
    #[arg(short = 'u', long)]
    pub user: Option<UserId>,

    /// Use the bundled mock dataset instead of the backend.
    #[arg(long)]
    pub mock: bool,

    /// Backend base URL; requests go to `{server}/{userId}/...`.
    #[arg(long, value_name = "URL", conflicts_with = "mock")]
    pub server: Option<String>,

    /// Dashboard URL such as `http://localhost:3001/user/18?mockedData`.
    ///
    /// The path picks the user; a `mockedData` query flag selects mock data.
    #[arg(long, value_name = "DASHBOARD_URL")]
    pub url: Option<String>,

    /// How late responses are applied when the user changes mid-fetch.
    #[arg(long, value_enum, default_value_t = StalePolicy::LastResolvedWins)]
    pub stale_policy: StalePolicy,
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Chart width (columns).
    #[arg(long, default_value_t = 56)]
    pub width: usize,

    /// Session chart height (rows).
    #[arg(long, default_value_t = 8)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Dataset to print.
    #[arg(value_enum)]
    pub kind: DatasetKind,

    /// Pretty-print the JSON.
    #[arg(long)]
    pub pretty: bool,
}
