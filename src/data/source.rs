//! Raw record sources: the live backend or the bundled mock table.
//!
//! Which one is used is decided once, from `config::SourceMode`, when the
//! fetcher is built.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::SourceMode;
use crate::data::mock::MockSource;
use crate::domain::{DatasetKind, UserId};
use crate::error::{AppError, EXIT_USAGE, FetchError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub enum DataSource {
    Http(HttpSource),
    Mock(MockSource),
}

impl DataSource {
    pub fn from_mode(mode: &SourceMode) -> Result<Self, AppError> {
        match mode {
            SourceMode::Http { base } => Ok(DataSource::Http(HttpSource::new(base.clone())?)),
            SourceMode::Mock => Ok(DataSource::Mock(MockSource::bundled()?)),
        }
    }

    /// Fetch the raw JSON record for `user`.
    pub fn fetch_raw(&self, kind: DatasetKind, user: UserId) -> Result<Value, FetchError> {
        match self {
            DataSource::Http(http) => http.fetch(kind, user),
            DataSource::Mock(mock) => mock.lookup(kind, user),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataSource::Http(_) => "http",
            DataSource::Mock(_) => "mock",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: Url) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `{base}/{userId}` for the profile, `{base}/{userId}/{subpath}` otherwise.
    pub fn endpoint_url(&self, kind: DatasetKind, user: UserId) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        match kind.endpoint() {
            "" => format!("{base}/{user}"),
            sub => format!("{base}/{user}/{sub}"),
        }
    }

    fn fetch(&self, kind: DatasetKind, user: UserId) -> Result<Value, FetchError> {
        let url = self.endpoint_url(kind, user);
        debug!(%url, %kind, "GET");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| FetchError::Network(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound { kind, user });
        }
        if !status.is_success() {
            warn!(%url, %status, "backend returned an error status");
            return Err(FetchError::Network(format!("{url} returned status {status}")));
        }

        let body: Value = resp
            .json()
            .map_err(|e| FetchError::Network(format!("{url} did not return JSON: {e}")))?;

        unwrap_payload(body).ok_or(FetchError::NotFound { kind, user })
    }
}

/// Take the nested `data` field when the body is an envelope, else the body.
///
/// `None` when the resulting payload is JSON `null`.
pub fn unwrap_payload(body: Value) -> Option<Value> {
    let payload = match body {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    (!payload.is_null()).then_some(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_is_unwrapped() {
        let body = json!({ "data": { "id": 12 } });
        assert_eq!(unwrap_payload(body), Some(json!({ "id": 12 })));
    }

    #[test]
    fn bare_body_is_kept() {
        let body = json!({ "id": 12, "todayScore": 0.12 });
        assert_eq!(unwrap_payload(body.clone()), Some(body));
    }

    #[test]
    fn null_payload_is_none() {
        assert_eq!(unwrap_payload(json!({ "data": null })), None);
        assert_eq!(unwrap_payload(Value::Null), None);
    }

    #[test]
    fn endpoint_urls_follow_backend_layout() {
        let http = HttpSource::new(Url::parse("http://localhost:3000/user/").unwrap()).unwrap();
        assert_eq!(
            http.endpoint_url(DatasetKind::Profile, UserId(12)),
            "http://localhost:3000/user/12"
        );
        assert_eq!(
            http.endpoint_url(DatasetKind::AverageSessions, UserId(18)),
            "http://localhost:3000/user/18/average-sessions"
        );
    }
}
