//! Shared domain types.
//!
//! These mirror the backend's JSON payloads. They are plain serializable
//! records: built once by deserialization (or by normalization in
//! `data::fetcher`) and never mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// User shown when no id is given (the dashboard root redirects here).
pub const DEFAULT_USER: UserId = UserId(12);

/// Identifier of a dashboard user.
///
/// Only used as a lookup key; any non-negative integer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl UserId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u32>()
            .map(UserId)
            .map_err(|_| format!("invalid user id '{trimmed}': expected a non-negative integer"))
    }
}

/// The four retrievable data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
    Profile,
    Activity,
    AverageSessions,
    Performance,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Profile,
        DatasetKind::Activity,
        DatasetKind::AverageSessions,
        DatasetKind::Performance,
    ];

    /// Sub-path appended to `{base}/{userId}`; empty for the profile.
    pub fn endpoint(self) -> &'static str {
        match self {
            DatasetKind::Profile => "",
            DatasetKind::Activity => "activity",
            DatasetKind::AverageSessions => "average-sessions",
            DatasetKind::Performance => "performance",
        }
    }

    /// Table name in the bundled mock dataset.
    pub fn mock_table(self) -> &'static str {
        match self {
            DatasetKind::Profile => "USER_MAIN_DATA",
            DatasetKind::Activity => "USER_ACTIVITY",
            DatasetKind::AverageSessions => "USER_AVERAGE_SESSIONS",
            DatasetKind::Performance => "USER_PERFORMANCE",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            DatasetKind::Profile => "profile",
            DatasetKind::Activity => "activity",
            DatasetKind::AverageSessions => "average sessions",
            DatasetKind::Performance => "performance",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Static profile snapshot (`GET {base}/{userId}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u32,
    pub user_infos: UserInfos,
    /// Fraction of the daily goal reached, `0.0..=1.0`.
    ///
    /// Some records carry this as `score` instead of `todayScore`.
    #[serde(alias = "score")]
    pub today_score: f64,
    pub key_data: KeyData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfos {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
}

/// Daily nutrition counts. Plain numbers, no units encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyData {
    pub calorie_count: u32,
    pub protein_count: u32,
    pub carbohydrate_count: u32,
    pub lipid_count: u32,
}

/// One raw activity entry as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySession {
    pub day: String,
    #[serde(default)]
    pub kilogram: Option<f64>,
    pub calories: f64,
}

/// Per-day activity totals, ready for the bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDay {
    pub day: String,
    pub calories: f64,
    pub kilograms: f64,
}

/// Average session length for one weekday (1 = Monday .. 7 = Sunday).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageSession {
    pub day: u8,
    /// Minutes.
    pub session_length: u32,
}

/// Performance scores per category (`GET {base}/{userId}/performance`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u32>,
    /// Numeric category id -> category name (`"cardio"`, `"energy"`, ...).
    pub kind: BTreeMap<u32, String>,
    pub data: Vec<PerformanceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub value: f64,
    pub kind: u32,
}

impl Performance {
    /// Category name for an entry, if the `kind` table knows its id.
    pub fn kind_name(&self, entry: &PerformanceEntry) -> Option<&str> {
        self.kind.get(&entry.kind).map(String::as_str)
    }
}

/// Known performance categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PerformanceCategory {
    Intensity,
    Speed,
    Strength,
    Endurance,
    Energy,
    Cardio,
}

impl PerformanceCategory {
    pub const DISPLAY_ORDER: [PerformanceCategory; 6] = [
        PerformanceCategory::Intensity,
        PerformanceCategory::Speed,
        PerformanceCategory::Strength,
        PerformanceCategory::Endurance,
        PerformanceCategory::Energy,
        PerformanceCategory::Cardio,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "intensity" => Some(PerformanceCategory::Intensity),
            "speed" => Some(PerformanceCategory::Speed),
            "strength" => Some(PerformanceCategory::Strength),
            "endurance" => Some(PerformanceCategory::Endurance),
            "energy" => Some(PerformanceCategory::Energy),
            "cardio" => Some(PerformanceCategory::Cardio),
            _ => None,
        }
    }

    /// French label shown on the chart.
    pub fn label(self) -> &'static str {
        match self {
            PerformanceCategory::Intensity => "Intensité",
            PerformanceCategory::Speed => "Vitesse",
            PerformanceCategory::Strength => "Force",
            PerformanceCategory::Endurance => "Endurance",
            PerformanceCategory::Energy => "Énergie",
            PerformanceCategory::Cardio => "Cardio",
        }
    }

    /// 1-based display priority.
    pub fn priority(self) -> u8 {
        match self {
            PerformanceCategory::Intensity => 1,
            PerformanceCategory::Speed => 2,
            PerformanceCategory::Strength => 3,
            PerformanceCategory::Endurance => 4,
            PerformanceCategory::Energy => 5,
            PerformanceCategory::Cardio => 6,
        }
    }
}

/// Any one normalized dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dataset {
    Profile(Profile),
    Activity(Vec<ActivityDay>),
    AverageSessions(Vec<AverageSession>),
    Performance(Performance),
}

impl Dataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Profile(_) => DatasetKind::Profile,
            Dataset::Activity(_) => DatasetKind::Activity,
            Dataset::AverageSessions(_) => DatasetKind::AverageSessions,
            Dataset::Performance(_) => DatasetKind::Performance,
        }
    }
}
