//! Data acquisition: sources, normalization, and background loading.

pub mod fetcher;
pub mod loader;
pub mod mock;
pub mod source;

pub use fetcher::{DataFetcher, extract_minutes, group_activity_by_day};
pub use loader::{Loaded, Loader, RequestId, SlotState, StalePolicy, ViewSlot};
pub use mock::MockSource;
pub use source::{DataSource, HttpSource, unwrap_payload};
