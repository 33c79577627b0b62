//! Presentation helpers: labels, ordering, and number formatting.
//!
//! Everything here works on already-normalized records. Display concerns
//! (French labels, category order, weekday letters) live here rather than in
//! the fetcher.

use crate::domain::{KeyData, Performance, PerformanceCategory};

pub mod format;

pub use format::format_dashboard;

/// Weekday initials for days 1..=7 (Monday first).
const WEEKDAY_LETTERS: [&str; 7] = ["L", "M", "M", "J", "V", "S", "D"];

/// One bar of the performance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    pub label: String,
    pub value: f64,
    pub category: Option<PerformanceCategory>,
}

/// Translate category names and order rows by display priority.
///
/// Names the category table does not know keep their raw name (or `#id`)
/// and sort after the known ones, in input order.
pub fn performance_rows(perf: &Performance) -> Vec<PerformanceRow> {
    let mut rows: Vec<PerformanceRow> = perf
        .data
        .iter()
        .map(|entry| {
            let name = perf.kind_name(entry);
            let category = name.and_then(PerformanceCategory::from_name);
            let label = match (category, name) {
                (Some(cat), _) => cat.label().to_string(),
                (None, Some(raw)) => raw.to_string(),
                (None, None) => format!("#{}", entry.kind),
            };
            PerformanceRow {
                label,
                value: entry.value,
                category,
            }
        })
        .collect();

    rows.sort_by_key(|r| r.category.map(|c| c.priority()).unwrap_or(u8::MAX));
    rows
}

pub fn weekday_label(day: u8) -> &'static str {
    match day {
        1..=7 => WEEKDAY_LETTERS[usize::from(day) - 1],
        _ => "?",
    }
}

/// `0 min`, `45min`, `1h 5min`.
pub fn format_minutes(minutes: u32) -> String {
    if minutes == 0 {
        return "0 min".to_string();
    }
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}min")
    } else {
        format!("{rest}min")
    }
}

/// Calorie count shown in thousands: `1930` -> `1.93`, `2500` -> `2.5`.
pub fn format_kcal(calorie_count: u32) -> String {
    let value = f64::from(calorie_count) / 1000.0;
    let fixed = format!("{value:.3}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (trimmed, None),
    };
    let grouped = group_thousands(int_part);
    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Score as a rounded percentage.
pub fn score_percent(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// A nutrition summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NutritionCard {
    pub label: &'static str,
    pub amount: String,
}

pub fn nutrition_cards(key_data: &KeyData) -> [NutritionCard; 4] {
    [
        NutritionCard {
            label: "Calories",
            amount: format!("{}kCal", format_kcal(key_data.calorie_count)),
        },
        NutritionCard {
            label: "Protéines",
            amount: format!("{}g", key_data.protein_count),
        },
        NutritionCard {
            label: "Glucides",
            amount: format!("{}g", key_data.carbohydrate_count),
        },
        NutritionCard {
            label: "Lipides",
            amount: format!("{}g", key_data.lipid_count),
        },
    ]
}

/// Plain number formatting for chart values (`80`, `80.5`).
pub fn fmt_value(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::PerformanceEntry;

    fn perf(kinds: &[(u32, &str)], data: &[(u32, f64)]) -> Performance {
        Performance {
            user_id: Some(12),
            kind: kinds.iter().map(|&(k, n)| (k, n.to_string())).collect::<BTreeMap<_, _>>(),
            data: data.iter().map(|&(kind, value)| PerformanceEntry { value, kind }).collect(),
        }
    }

    #[test]
    fn performance_rows_are_translated_and_ordered() {
        let p = perf(
            &[(1, "cardio"), (2, "energy"), (3, "endurance"), (4, "strength"), (5, "speed"), (6, "intensity")],
            &[(1, 80.0), (2, 120.0), (3, 140.0), (4, 50.0), (5, 200.0), (6, 90.0)],
        );
        let rows = performance_rows(&p);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Intensité", "Vitesse", "Force", "Endurance", "Énergie", "Cardio"]);
        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![90.0, 200.0, 50.0, 140.0, 120.0, 80.0]);
    }

    #[test]
    fn unknown_categories_sort_last() {
        let p = perf(&[(1, "yoga"), (2, "cardio")], &[(1, 10.0), (3, 5.0), (2, 20.0)]);
        let rows = performance_rows(&p);
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Cardio", "yoga", "#3"]);
    }

    #[test]
    fn weekday_letters() {
        let letters: Vec<&str> = (1..=7).map(weekday_label).collect();
        assert_eq!(letters, vec!["L", "M", "M", "J", "V", "S", "D"]);
        assert_eq!(weekday_label(0), "?");
        assert_eq!(weekday_label(8), "?");
    }

    #[test]
    fn minutes_formatting() {
        assert_eq!(format_minutes(0), "0 min");
        assert_eq!(format_minutes(45), "45min");
        assert_eq!(format_minutes(60), "1h 0min");
        assert_eq!(format_minutes(125), "2h 5min");
    }

    #[test]
    fn kcal_formatting() {
        assert_eq!(format_kcal(1930), "1.93");
        assert_eq!(format_kcal(2500), "2.5");
        assert_eq!(format_kcal(1000), "1");
        assert_eq!(format_kcal(1_234_567), "1,234.567");
        assert_eq!(format_kcal(0), "0");
    }

    #[test]
    fn score_and_cards() {
        assert_eq!(score_percent(0.12), 12);
        assert_eq!(score_percent(0.3), 30);
        assert_eq!(score_percent(1.7), 100);

        let cards = nutrition_cards(&KeyData {
            calorie_count: 1930,
            protein_count: 155,
            carbohydrate_count: 290,
            lipid_count: 50,
        });
        assert_eq!(cards[0].amount, "1.93kCal");
        assert_eq!(cards[3], NutritionCard { label: "Lipides", amount: "50g".to_string() });
    }
}
