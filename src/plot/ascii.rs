//! ASCII/Unicode charts for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks in a terminal or a pipe
//! - deterministic output (helpful for golden tests)
//!
//! Chart elements:
//! - session line: `*` at each day, `-` between days
//! - bars: `█` scaled to the largest value in the chart

use crate::domain::{ActivityDay, AverageSession};
use crate::report::{PerformanceRow, fmt_value, score_percent, weekday_label};

const BAR: char = '█';

/// Average session length per weekday as a line chart, weekday letters below.
pub fn render_session_chart(sessions: &[AverageSession], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(3);

    let max = sessions.iter().map(|s| s.session_length).max().unwrap_or(0);
    let y_max = f64::from(max.max(1));

    let n = sessions.len();
    let points: Vec<(usize, usize)> = sessions
        .iter()
        .enumerate()
        .map(|(i, s)| (map_index(i, n, width), map_y(f64::from(s.session_length), y_max, height)))
        .collect();

    let mut grid = vec![vec![' '; width]; height];
    for w in points.windows(2) {
        draw_line(&mut grid, w[0].0, w[0].1, w[1].0, w[1].1, '-');
    }
    for &(x, y) in &points {
        grid[y][x] = '*';
    }

    let mut axis = vec![' '; width];
    for (s, &(x, _)) in sessions.iter().zip(&points) {
        if let Some(ch) = weekday_label(s.day).chars().next() {
            axis[x] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!("Durée moyenne des sessions (max {max} min)\n"));
    for row in grid {
        push_row(&mut out, row);
    }
    push_row(&mut out, axis);
    out
}

/// Daily activity: one kilogram bar and one calorie bar per day.
///
/// Days are labeled by position (1, 2, ...) like the web chart's x-axis.
/// Each series is scaled to its own maximum.
pub fn render_activity_chart(days: &[ActivityDay], width: usize) -> String {
    let width = width.max(10);
    let kg_max = days.iter().map(|d| d.kilograms).fold(0.0_f64, f64::max);
    let cal_max = days.iter().map(|d| d.calories).fold(0.0_f64, f64::max);
    let idx_width = days.len().to_string().len();

    let mut out = String::new();
    out.push_str("Activité quotidienne\n");
    for (i, day) in days.iter().enumerate() {
        out.push_str(&format!(
            "{:>idx_width$} kg   {}\n",
            i + 1,
            bar_with_value(day.kilograms, kg_max, width)
        ));
        out.push_str(&format!(
            "{:>idx_width$} kcal {}\n",
            "",
            bar_with_value(day.calories, cal_max, width)
        ));
    }
    out
}

/// Labeled horizontal bars, one per row, sharing one scale.
pub fn render_bar_rows(rows: &[(String, f64)], width: usize) -> String {
    let width = width.max(10);
    let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (label, value) in rows {
        let line = format!("{label:<label_width$} {}", bar_with_value(*value, max, width));
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn render_performance_chart(rows: &[PerformanceRow], width: usize) -> String {
    let pairs: Vec<(String, f64)> = rows.iter().map(|r| (r.label.clone(), r.value)).collect();
    render_bar_rows(&pairs, width)
}

/// `[###-------------] 12% de votre objectif`
pub fn render_score_gauge(score: f64, width: usize) -> String {
    let width = width.max(10);
    let pct = score_percent(score);
    let filled = ((f64::from(pct) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {pct}% de votre objectif",
        "#".repeat(filled),
        "-".repeat(width - filled)
    )
}

fn bar_with_value(value: f64, max: f64, width: usize) -> String {
    let len = if max > 0.0 && value.is_finite() && value > 0.0 {
        ((value / max) * width as f64).round() as usize
    } else {
        0
    };
    let bar: String = std::iter::repeat_n(BAR, len.min(width)).collect();
    format!("{bar} {}", fmt_value(value))
}

fn push_row(out: &mut String, row: Vec<char>) {
    let line: String = row.into_iter().collect();
    out.push_str(line.trim_end());
    out.push('\n');
}

fn map_index(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
