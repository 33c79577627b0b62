//! Ratatui-based terminal UI.
//!
//! One screen: greeting, daily activity, average session length,
//! performance by category, score and nutrition for the active user.
//! Every view loads in the background and renders its own
//! loading/error state.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};
use tracing::info;

use crate::app::pipeline::DashboardState;
use crate::config::DataConfig;
use crate::data::{DataFetcher, DataSource, Loader, MockSource, SlotState, ViewSlot};
use crate::domain::UserId;
use crate::error::{AppError, EXIT_DATA};
use crate::report::{self, format::CONGRATULATIONS};

mod plotters_chart;

use plotters_chart::{DashPlottersChart, Series, SeriesStyle, padded_bounds};

const KG_COLOR: RGBColor = RGBColor(200, 200, 200);
const KCAL_COLOR: RGBColor = RGBColor(230, 0, 0);
const SESSION_COLOR: RGBColor = RGBColor(255, 96, 96);

/// Start the TUI.
pub fn run(config: DataConfig) -> Result<(), AppError> {
    let fetcher = Arc::new(DataFetcher::from_config(&config)?);
    let mut app = App::new(fetcher, &config);

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_DATA, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_DATA, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_DATA, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    state: DashboardState,
    loader: Loader,
    users: Vec<UserId>,
    source_label: &'static str,
    status: String,
}

impl App {
    fn new(fetcher: Arc<DataFetcher>, config: &DataConfig) -> Self {
        let source_label = fetcher.source().label();
        let users = known_users(fetcher.source(), config.user);
        let mut loader = Loader::new(fetcher);
        let mut state = DashboardState::new(config.user, config.stale_policy);
        state.request_all(&mut loader, config.user);

        Self {
            state,
            loader,
            users,
            source_label,
            status: format!("Loading user {}...", config.user),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_loader() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_DATA, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_DATA, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_DATA, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply every finished retrieval. Returns whether anything changed.
    fn drain_loader(&mut self) -> bool {
        let mut received = false;
        while let Some(loaded) = self.loader.try_next() {
            self.state.apply(loaded);
            received = true;
        }
        if received && !self.state.is_loading() {
            let at = self
                .state
                .last_update
                .map(|t| t.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            self.status = format!("User {} loaded at {at}", self.state.user);
        }
        received
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.switch_user(-1),
            KeyCode::Right => self.switch_user(1),
            KeyCode::Char('r') => {
                let user = self.state.user;
                self.state.request_all(&mut self.loader, user);
                self.status = format!("Reloading user {user}...");
            }
            _ => {}
        }
        false
    }

    fn switch_user(&mut self, delta: isize) {
        let next = step_user(&self.users, self.state.user, delta);
        if next == self.state.user {
            self.status = "No other user to switch to.".to_string();
            return;
        }
        info!(from = %self.state.user, to = %next, "switching user");
        self.state.request_all(&mut self.loader, next);
        self.status = format!("Loading user {next}...");
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        let greeting = match self.state.profile.state() {
            SlotState::Ready(p) => Span::styled(
                format!("Bonjour {}", p.user_infos.first_name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            SlotState::Failed(err) => Span::styled(
                format!("Error: failed to load profile data: {err}"),
                Style::default().fg(Color::Red),
            ),
            SlotState::Loading | SlotState::Idle => Span::styled("Loading...", Style::default().fg(Color::Yellow)),
        };
        lines.push(Line::from(vec![
            Span::styled("fitdash", Style::default().fg(Color::Cyan)),
            Span::raw(" - "),
            greeting,
        ]));
        if self.state.profile.value().is_some() {
            lines.push(Line::from(CONGRATULATIONS));
        } else {
            lines.push(Line::from(""));
        }

        let updated = self
            .state
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(Span::styled(
            format!(
                "user: {} | source: {} | stale policy: {:?} | updated: {updated}",
                self.state.user, self.source_label, self.state.policy,
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(area);
        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[0]);
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ])
            .split(rows[1]);

        self.draw_activity(frame, charts[0]);
        self.draw_sessions(frame, charts[1]);
        self.draw_performance(frame, cards[0]);
        self.draw_score(frame, cards[1]);
        self.draw_nutrition(frame, cards[2]);
    }

    fn draw_activity(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, days)) = open_block(frame, area, "Activité quotidienne", &self.state.activity, "activity")
        else {
            return;
        };

        let kg: Vec<(f64, f64)> = days.iter().enumerate().map(|(i, d)| (i as f64 + 1.0, d.kilograms)).collect();
        let kcal: Vec<(f64, f64)> = days.iter().enumerate().map(|(i, d)| (i as f64 + 1.0, d.calories)).collect();
        let x_bounds = [0.5, days.len().max(1) as f64 + 0.5];

        let halves = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let charts = [
            ("Poids (kg)", &kg, KG_COLOR, padded_bounds(kg.iter().map(|p| p.1), 0.2, false)),
            ("Calories brûlées (kCal)", &kcal, KCAL_COLOR, padded_bounds(kcal.iter().map(|p| p.1), 0.1, true)),
        ];
        for ((title, points, color, y_bounds), rect) in charts.into_iter().zip(halves.iter()) {
            let (legend, chart_rect) = split_legend(*rect);
            frame.render_widget(
                Paragraph::new(title).style(Style::default().fg(Color::Gray)),
                legend,
            );
            frame.render_widget(
                DashPlottersChart {
                    series: vec![Series {
                        points,
                        color,
                        style: SeriesStyle::Bars { half_width: 0.2 },
                    }],
                    x_bounds,
                    y_bounds,
                    x_ticks: days.len().max(1),
                    y_ticks: 3,
                    fmt_x: fmt_axis_day_index,
                    fmt_y: fmt_axis_value,
                },
                chart_rect,
            );
        }
    }

    fn draw_sessions(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, sessions)) =
            open_block(frame, area, "Durée moyenne des sessions", &self.state.sessions, "session length")
        else {
            return;
        };

        let points: Vec<(f64, f64)> = sessions
            .iter()
            .map(|s| (f64::from(s.day), f64::from(s.session_length)))
            .collect();
        let first = points.first().map(|p| p.0).unwrap_or(1.0);
        let last = points.last().map(|p| p.0).unwrap_or(7.0);
        let x_bounds = [first.min(last) - 0.5, first.max(last) + 0.5];
        let y_bounds = padded_bounds(points.iter().map(|p| p.1), 0.2, true);

        let longest = sessions.iter().map(|s| s.session_length).max().unwrap_or(0);
        let (legend, chart_rect) = split_legend(inner);
        frame.render_widget(
            Paragraph::new(format!("max {}", report::format_minutes(longest))).style(Style::default().fg(Color::Gray)),
            legend,
        );
        frame.render_widget(
            DashPlottersChart {
                series: vec![Series {
                    points: &points,
                    color: SESSION_COLOR,
                    style: SeriesStyle::Line,
                }],
                x_bounds,
                y_bounds,
                x_ticks: sessions.len().max(1),
                y_ticks: 3,
                fmt_x: fmt_axis_weekday,
                fmt_y: fmt_axis_value,
            },
            chart_rect,
        );
    }

    fn draw_performance(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, perf)) = open_block(frame, area, "Performance", &self.state.performance, "performance")
        else {
            return;
        };
        let rows = report::performance_rows(perf);
        let bar_width = usize::from(inner.width.saturating_sub(16));
        let txt = crate::plot::render_performance_chart(&rows, bar_width);
        frame.render_widget(Paragraph::new(txt), inner);
    }

    fn draw_score(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, profile)) = open_block(frame, area, "Score", &self.state.profile, "score") else {
            return;
        };
        let pct = report::score_percent(profile.today_score);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Red))
            .ratio(profile.today_score.clamp(0.0, 1.0))
            .label(format!("{pct}% de votre objectif"));
        let rect = Rect {
            x: inner.x,
            y: inner.y + inner.height / 2,
            width: inner.width,
            height: inner.height.min(1),
        };
        frame.render_widget(gauge, rect);
    }

    fn draw_nutrition(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((inner, profile)) = open_block(frame, area, "Nutrition", &self.state.profile, "nutrition") else {
            return;
        };
        let lines: Vec<Line> = report::nutrition_cards(&profile.key_data)
            .iter()
            .map(|card| {
                Line::from(vec![
                    Span::styled(format!("{:<10}", card.label), Style::default().fg(Color::Gray)),
                    Span::styled(card.amount.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(Text::from(lines)), inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ switch user  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Draw a titled block and return its inner area and the view's value.
///
/// When the view has no value yet, the block shows its load state instead
/// and `None` is returned.
fn open_block<'s, T>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    slot: &'s ViewSlot<T>,
    view: &str,
) -> Option<(Rect, &'s T)> {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let msg = match slot.state() {
        SlotState::Ready(value) => return Some((inner, value)),
        SlotState::Loading => Paragraph::new("Loading...").style(Style::default().fg(Color::Yellow)),
        SlotState::Idle => Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Gray)),
        SlotState::Failed(err) => Paragraph::new(format!("Error: failed to load {view} data: {err}"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true }),
    };
    frame.render_widget(msg, inner);
    None
}

/// One line for a legend, the rest for the chart.
fn split_legend(area: Rect) -> (Rect, Rect) {
    let legend = Rect { height: area.height.min(1), ..area };
    let chart = Rect {
        y: area.y + legend.height,
        height: area.height - legend.height,
        ..area
    };
    (legend, chart)
}

/// Users the arrow keys cycle through: the bundled ids, plus the active
/// user when it is not among them.
fn known_users(source: &DataSource, active: UserId) -> Vec<UserId> {
    let mut users = match source {
        DataSource::Mock(mock) => mock.user_ids(),
        DataSource::Http(_) => MockSource::bundled().map(|m| m.user_ids()).unwrap_or_default(),
    };
    if !users.contains(&active) {
        users.push(active);
    }
    users
}

/// The user `delta` steps away from `current`, wrapping at both ends.
fn step_user(users: &[UserId], current: UserId, delta: isize) -> UserId {
    let Some(pos) = users.iter().position(|&u| u == current) else {
        return users.first().copied().unwrap_or(current);
    };
    let n = users.len() as isize;
    users[(pos as isize + delta).rem_euclid(n) as usize]
}

fn near_integer(v: f64) -> Option<i64> {
    let r = v.round();
    ((v - r).abs() < 1e-6).then_some(r as i64)
}

fn fmt_axis_day_index(v: f64) -> String {
    near_integer(v).filter(|&i| i >= 1).map(|i| i.to_string()).unwrap_or_default()
}

fn fmt_axis_weekday(v: f64) -> String {
    near_integer(v)
        .and_then(|i| u8::try_from(i).ok())
        .map(|d| report::weekday_label(d).to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.0}")
}
