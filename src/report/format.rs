//! Text rendering of a loaded dashboard.
//!
//! Each section renders on its own: a view whose data failed prints its
//! error line and the others are unaffected.

use crate::app::pipeline::DashboardState;
use crate::data::{SlotState, ViewSlot};
use crate::domain::Profile;
use crate::plot;
use crate::report::{nutrition_cards, performance_rows};

pub const CONGRATULATIONS: &str = "Félicitation ! Vous avez explosé vos objectifs hier 👏";

/// Full text dashboard for `fitdash show`.
pub fn format_dashboard(state: &DashboardState, source_label: &str, width: usize, height: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== fitdash - user {} ({source_label}) ===\n", state.user));
    out.push_str(&section(&state.profile, "profile", greeting));
    out.push('\n');

    out.push_str(&section(&state.activity, "activity", |days| {
        plot::render_activity_chart(days, width)
    }));
    out.push('\n');

    out.push_str(&section(&state.sessions, "session length", |sessions| {
        plot::render_session_chart(sessions, width, height)
    }));
    out.push('\n');

    out.push_str(&section(&state.performance, "performance", |perf| {
        format!("Performance\n{}", plot::render_performance_chart(&performance_rows(perf), width))
    }));
    out.push('\n');

    out.push_str(&section(&state.profile, "score", |p| {
        format!("Score\n{}\n", plot::render_score_gauge(p.today_score, width.min(30)))
    }));
    out.push('\n');

    out.push_str(&section(&state.profile, "nutrition", nutrition));

    out
}

pub fn greeting(profile: &Profile) -> String {
    format!("Bonjour {}\n{CONGRATULATIONS}\n", profile.user_infos.first_name)
}

pub fn nutrition(profile: &Profile) -> String {
    let cards = nutrition_cards(&profile.key_data);
    let label_width = cards.iter().map(|c| c.label.chars().count()).max().unwrap_or(0);
    let mut out = String::from("Nutrition\n");
    for card in &cards {
        out.push_str(&format!("  {:<label_width$}  {}\n", card.label, card.amount));
    }
    out
}

fn section<T>(slot: &ViewSlot<T>, view: &str, render: impl FnOnce(&T) -> String) -> String {
    match slot.state() {
        SlotState::Ready(value) => render(value),
        SlotState::Loading => "Loading...\n".to_string(),
        SlotState::Idle => "-\n".to_string(),
        SlotState::Failed(err) => format!("Error: failed to load {view} data: {err}\n"),
    }
}
