//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - user and dataset identifiers (`UserId`, `DatasetKind`)
//! - the four records views consume (`Profile`, `ActivityDay`,
//!   `AverageSession`, `Performance`)
//! - performance categories with their display labels and order

pub mod types;

pub use types::*;
