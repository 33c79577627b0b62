//! `fitdash` library crate.
//!
//! The binary (`fitdash`) is a thin wrapper around this library so that:
//!
//! - data retrieval and normalization are testable without spawning processes
//! - the text and terminal front-ends share one loading path

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
