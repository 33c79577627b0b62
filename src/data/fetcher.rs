//! Dataset retrieval and normalization.
//!
//! Each operation asks the configured source for one raw record and reshapes
//! it into the flat structure its chart consumes.

use std::collections::HashMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::DataConfig;
use crate::data::source::DataSource;
use crate::domain::{
    ActivityDay, ActivitySession, AverageSession, Dataset, DatasetKind, Performance, Profile, UserId,
};
use crate::error::{AppError, FetchError};

/// Field name used when a session length cannot be read.
pub const SESSION_LENGTH_FIELD: &str = "sessionLength";

#[derive(Debug, Deserialize)]
struct RawSessions<T> {
    sessions: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawAverageSession {
    day: u8,
    #[serde(rename = "sessionLength")]
    session_length: Value,
}

#[derive(Debug, Clone)]
pub struct DataFetcher {
    source: DataSource,
}

impl DataFetcher {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    pub fn from_config(config: &DataConfig) -> Result<Self, AppError> {
        Ok(Self::new(DataSource::from_mode(&config.source)?))
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn profile(&self, user: UserId) -> Result<Profile, FetchError> {
        let raw = self.raw(DatasetKind::Profile, user)?;
        decode(DatasetKind::Profile, raw)
    }

    /// Daily totals, one record per distinct day in first-seen order.
    pub fn activity(&self, user: UserId) -> Result<Vec<ActivityDay>, FetchError> {
        let raw = self.raw(DatasetKind::Activity, user)?;
        let raw: RawSessions<ActivitySession> = decode(DatasetKind::Activity, raw)?;
        Ok(group_activity_by_day(&raw.sessions))
    }

    /// Fails with `MalformedField` if any session length has no digits.
    pub fn average_sessions(&self, user: UserId) -> Result<Vec<AverageSession>, FetchError> {
        let raw = self.raw(DatasetKind::AverageSessions, user)?;
        let raw: RawSessions<RawAverageSession> = decode(DatasetKind::AverageSessions, raw)?;
        raw.sessions
            .iter()
            .map(|s| {
                let minutes = extract_minutes(&s.session_length).ok_or_else(|| FetchError::MalformedField {
                    field: SESSION_LENGTH_FIELD,
                    value: value_text(&s.session_length),
                })?;
                Ok(AverageSession {
                    day: s.day,
                    session_length: minutes,
                })
            })
            .collect()
    }

    pub fn performance(&self, user: UserId) -> Result<Performance, FetchError> {
        let raw = self.raw(DatasetKind::Performance, user)?;
        decode(DatasetKind::Performance, raw)
    }

    pub fn dataset(&self, kind: DatasetKind, user: UserId) -> Result<Dataset, FetchError> {
        match kind {
            DatasetKind::Profile => self.profile(user).map(Dataset::Profile),
            DatasetKind::Activity => self.activity(user).map(Dataset::Activity),
            DatasetKind::AverageSessions => self.average_sessions(user).map(Dataset::AverageSessions),
            DatasetKind::Performance => self.performance(user).map(Dataset::Performance),
        }
    }

    fn raw(&self, kind: DatasetKind, user: UserId) -> Result<Value, FetchError> {
        debug!(%kind, %user, source = self.source.label(), "fetching dataset");
        self.source.fetch_raw(kind, user)
    }
}

fn decode<T: DeserializeOwned>(kind: DatasetKind, raw: Value) -> Result<T, FetchError> {
    serde_json::from_value(raw).map_err(|e| FetchError::Decode {
        kind,
        message: e.to_string(),
    })
}

/// Single-pass accumulation keyed by day.
///
/// Calories and kilograms are summed per day; an entry without `kilogram`
/// adds nothing to that day's kilograms. Output order is the order in which
/// each day first appears, not calendar order.
pub fn group_activity_by_day(sessions: &[ActivitySession]) -> Vec<ActivityDay> {
    let mut out: Vec<ActivityDay> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for session in sessions {
        let slot = *index.entry(session.day.as_str()).or_insert_with(|| {
            out.push(ActivityDay {
                day: session.day.clone(),
                calories: 0.0,
                kilograms: 0.0,
            });
            out.len() - 1
        });

        let day = &mut out[slot];
        day.calories += session.calories;
        if let Some(kg) = session.kilogram {
            day.kilograms += kg;
        }
    }

    out
}

/// First maximal run of ASCII digits in the value's string form.
///
/// `30`, `"30"` and `"30 min"` all give `Some(30)`; `"abc"` gives `None`.
pub fn extract_minutes(value: &Value) -> Option<u32> {
    let text = value_text(value);
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock::MockSource;
    use serde_json::json;

    fn session(day: &str, calories: f64, kilogram: Option<f64>) -> ActivitySession {
        ActivitySession {
            day: day.to_string(),
            kilogram,
            calories,
        }
    }

    fn mock_fetcher(raw: &str) -> DataFetcher {
        DataFetcher::new(DataSource::Mock(MockSource::from_json(raw).unwrap()))
    }

    #[test]
    fn activity_groups_by_first_seen_day() {
        let sessions = vec![
            session("1", 10.0, Some(70.0)),
            session("1", 5.0, Some(70.0)),
            session("2", 20.0, Some(68.0)),
        ];
        let days = group_activity_by_day(&sessions);
        assert_eq!(
            days,
            vec![
                ActivityDay {
                    day: "1".to_string(),
                    calories: 15.0,
                    kilograms: 140.0
                },
                ActivityDay {
                    day: "2".to_string(),
                    calories: 20.0,
                    kilograms: 68.0
                },
            ]
        );
    }

    #[test]
    fn activity_keeps_first_seen_order_not_calendar_order() {
        let sessions = vec![
            session("2020-07-03", 1.0, None),
            session("2020-07-01", 2.0, None),
            session("2020-07-03", 3.0, None),
        ];
        let days: Vec<String> = group_activity_by_day(&sessions).into_iter().map(|d| d.day).collect();
        assert_eq!(days, vec!["2020-07-03", "2020-07-01"]);
    }

    #[test]
    fn missing_kilogram_contributes_nothing() {
        let fetcher = mock_fetcher(
            r#"{ "USER_ACTIVITY": [ { "userId": 5, "sessions": [
                { "day": "1", "calories": 100 },
                { "day": "1", "kilogram": 72, "calories": 50 }
            ] } ] }"#,
        );
        let days = fetcher.activity(UserId(5)).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].calories, 150.0);
        assert_eq!(days[0].kilograms, 72.0);
    }

    #[test]
    fn extracts_minutes_from_numbers_and_strings() {
        assert_eq!(extract_minutes(&json!("30 min")), Some(30));
        assert_eq!(extract_minutes(&json!(45)), Some(45));
        assert_eq!(extract_minutes(&json!("about 12 or 15")), Some(12));
        assert_eq!(extract_minutes(&json!("abc")), None);
        assert_eq!(extract_minutes(&json!(null)), None);
    }

    #[test]
    fn session_length_without_digits_fails_the_retrieval() {
        let fetcher = mock_fetcher(
            r#"{ "USER_AVERAGE_SESSIONS": [ { "userId": 5, "sessions": [
                { "day": 1, "sessionLength": "30 min" },
                { "day": 2, "sessionLength": "abc" }
            ] } ] }"#,
        );
        let err = fetcher.average_sessions(UserId(5)).unwrap_err();
        assert_eq!(
            err,
            FetchError::MalformedField {
                field: SESSION_LENGTH_FIELD,
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn average_sessions_from_bundled_data() {
        let fetcher = DataFetcher::new(DataSource::Mock(MockSource::bundled().unwrap()));
        let sessions = fetcher.average_sessions(UserId(12)).unwrap();
        assert_eq!(sessions.len(), 7);
        assert_eq!(sessions[0], AverageSession { day: 1, session_length: 30 });
        assert_eq!(sessions[6], AverageSession { day: 7, session_length: 60 });
    }

    #[test]
    fn profile_id_matches_requested_user() {
        let fetcher = DataFetcher::new(DataSource::Mock(MockSource::bundled().unwrap()));
        for user in [UserId(12), UserId(18)] {
            assert_eq!(fetcher.profile(user).unwrap().id, user.get());
        }
    }

    #[test]
    fn repeated_profile_fetches_are_equal() {
        let fetcher = DataFetcher::new(DataSource::Mock(MockSource::bundled().unwrap()));
        assert_eq!(fetcher.profile(UserId(18)).unwrap(), fetcher.profile(UserId(18)).unwrap());
    }

    #[test]
    fn unknown_user_is_not_found_for_every_kind() {
        let fetcher = DataFetcher::new(DataSource::Mock(MockSource::bundled().unwrap()));
        for kind in DatasetKind::ALL {
            let err = fetcher.dataset(kind, UserId(404)).unwrap_err();
            assert_eq!(err, FetchError::NotFound { kind, user: UserId(404) });
        }
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let fetcher = mock_fetcher(r#"{ "USER_ACTIVITY": [ { "userId": 5, "sessions": "none" } ] }"#);
        assert!(matches!(
            fetcher.activity(UserId(5)),
            Err(FetchError::Decode {
                kind: DatasetKind::Activity,
                ..
            })
        ));
    }
}
