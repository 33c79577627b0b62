//! Bundled mock dataset, a stand-in for the backend.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{DatasetKind, UserId};
use crate::error::{AppError, EXIT_DATA, FetchError};

const BUNDLED: &str = include_str!("mock_data.json");

/// In-memory table keyed by dataset name; each value is an array of
/// per-user records.
#[derive(Debug, Clone)]
pub struct MockSource {
    tables: Arc<Map<String, Value>>,
}

impl MockSource {
    /// The dataset compiled into the binary (users 12 and 18).
    pub fn bundled() -> Result<Self, AppError> {
        Self::from_json(BUNDLED)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| AppError::new(EXIT_DATA, format!("Invalid mock dataset: {e}")))?;
        let Value::Object(tables) = value else {
            return Err(AppError::new(EXIT_DATA, "Mock dataset must be a JSON object of tables."));
        };
        Ok(Self {
            tables: Arc::new(tables),
        })
    }

    /// Linear scan for the record belonging to `user`.
    pub fn lookup(&self, kind: DatasetKind, user: UserId) -> Result<Value, FetchError> {
        self.tables
            .get(kind.mock_table())
            .and_then(Value::as_array)
            .and_then(|rows| rows.iter().find(|r| record_user(r) == Some(user)))
            .cloned()
            .ok_or(FetchError::NotFound { kind, user })
    }

    /// Users present in the profile table, in table order.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.tables
            .get(DatasetKind::Profile.mock_table())
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(record_user).collect())
            .unwrap_or_default()
    }
}

// Profile rows are keyed by `id`, the other tables by `userId`.
fn record_user(record: &Value) -> Option<UserId> {
    record
        .get("userId")
        .or_else(|| record.get("id"))
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .map(UserId)
}
