//! Runtime configuration.
//!
//! Resolved once at startup from CLI flags, the environment (optionally a
//! `.env` file), and defaults. The result is passed explicitly to whatever
//! needs it; nothing re-reads the environment later.

use url::Url;

use crate::cli::SourceArgs;
use crate::data::StalePolicy;
use crate::domain::{DEFAULT_USER, UserId};
use crate::error::AppError;

pub const DEFAULT_SERVER: &str = "http://localhost:3000/user";

/// Query flag that selects the mock dataset in a dashboard URL.
pub const MOCK_QUERY_FLAG: &str = "mockedData";

pub const ENV_SERVER: &str = "FITDASH_SERVER";
pub const ENV_MOCK: &str = "FITDASH_MOCK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    Http { base: Url },
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    pub source: SourceMode,
    pub user: UserId,
    pub stale_policy: StalePolicy,
}

/// Settings read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSettings {
    pub server: Option<String>,
    pub mock: bool,
}

impl EnvSettings {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            server: std::env::var(ENV_SERVER).ok().filter(|s| !s.trim().is_empty()),
            mock: std::env::var(ENV_MOCK).map(|v| is_truthy(&v)).unwrap_or(false),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// What a dashboard-style URL (`.../user/18?mockedData`) selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardUrl {
    pub user: UserId,
    pub mocked: bool,
}

impl DashboardUrl {
    /// `/user/{id}` picks the user; `/` redirects to the default user.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let url = Url::parse(raw).map_err(|e| AppError::usage(format!("Invalid dashboard URL '{raw}': {e}")))?;
        let mocked = url.query().is_some_and(|q| q.contains(MOCK_QUERY_FLAG));

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let user = match segments.as_slice() {
            [] => DEFAULT_USER,
            ["user", id] => id.parse::<UserId>().map_err(AppError::usage)?,
            _ => {
                return Err(AppError::usage(format!(
                    "Unrecognized dashboard path '{}': expected /user/<id>",
                    url.path()
                )));
            }
        };

        Ok(Self { user, mocked })
    }
}

/// Combine flags, environment, and defaults into one `DataConfig`.
///
/// Mock selection: a dashboard URL decides on its own (mock only with the
/// mock flag); otherwise `--mock`, then an explicit `--server`, then the
/// environment.
pub fn resolve(args: &SourceArgs, env: &EnvSettings) -> Result<DataConfig, AppError> {
    let dashboard = args.url.as_deref().map(DashboardUrl::parse).transpose()?;

    let mock = if let Some(d) = &dashboard {
        d.mocked || args.mock
    } else if args.mock {
        true
    } else if args.server.is_some() {
        false
    } else {
        env.mock
    };

    let source = if mock {
        SourceMode::Mock
    } else {
        let raw = args
            .server
            .as_deref()
            .or(env.server.as_deref())
            .unwrap_or(DEFAULT_SERVER);
        let base = Url::parse(raw).map_err(|e| AppError::usage(format!("Invalid server URL '{raw}': {e}")))?;
        SourceMode::Http { base }
    };

    let user = args
        .user
        .or(dashboard.as_ref().map(|d| d.user))
        .unwrap_or(DEFAULT_USER);

    Ok(DataConfig {
        source,
        user,
        stale_policy: args.stale_policy,
    })
}
