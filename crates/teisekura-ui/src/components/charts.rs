//! Trend line charts and the cumulative in-force bar chart.
//!
//! Point construction is kept separate from rendering so the numbers can be
//! tested without a terminal.

use ratatui::{
    layout::Rect,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use teisekura_core::models::{LifecycleEvent, PeriodCountTable, PeriodKey};
use teisekura_data::analysis::{CumulativePoint, SeriesMeans};

use crate::themes::Theme;

/// Headroom added above the tallest value, in statutes.
const Y_HEADROOM: f64 = 10.0;

/// Horizontal step between mean-line dots; gaps give the dashed look.
const MEAN_DOT_STEP: f64 = 0.5;

// ── Point construction ────────────────────────────────────────────────────────

/// `(index, count)` points for one lifecycle series.
pub fn series_points(table: &PeriodCountTable, event: LifecycleEvent) -> Vec<(f64, f64)> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let count = match event {
                LifecycleEvent::EnteredForce => row.entered_count,
                LifecycleEvent::Repealed => row.repealed_count,
            };
            (i as f64, count as f64)
        })
        .collect()
}

/// Dots at height `mean` spanning `len` periods.
pub fn mean_points(mean: f64, len: usize) -> Vec<(f64, f64)> {
    if len == 0 {
        return Vec::new();
    }
    let last = (len - 1) as f64;
    let steps = (last / MEAN_DOT_STEP).round() as usize;
    (0..=steps)
        .map(|i| ((i as f64 * MEAN_DOT_STEP).min(last), mean))
        .collect()
}

/// Upper y bound: the tallest count of either series plus headroom.
pub fn y_upper_bound(table: &PeriodCountTable) -> f64 {
    let max = table
        .rows
        .iter()
        .map(|r| r.entered_count.max(r.repealed_count))
        .max()
        .unwrap_or(0);
    max as f64 + Y_HEADROOM
}

/// First, middle and last period labels (deduplicated).
pub fn axis_labels(periods: &[&str]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    if periods.is_empty() {
        return labels;
    }
    for i in [0, periods.len() / 2, periods.len() - 1] {
        let label = periods[i].to_string();
        if labels.last() != Some(&label) {
            labels.push(label);
        }
    }
    labels
}

/// Bar heights for the cumulative series; a negative running total is drawn
/// as an empty bar.
pub fn cumulative_bars(points: &[CumulativePoint]) -> Vec<(String, u64)> {
    points
        .iter()
        .map(|p| (p.period.clone(), p.in_force.max(0) as u64))
        .collect()
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Line chart of entered and repealed counts, with optional mean lines.
pub fn render_trend_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    table: &PeriodCountTable,
    means: Option<SeriesMeans>,
    theme: &Theme,
) {
    let entered = series_points(table, LifecycleEvent::EnteredForce);
    let repealed = series_points(table, LifecycleEvent::Repealed);
    let (entered_mean, repealed_mean) = match means {
        Some(m) => (
            mean_points(m.entered, table.len()),
            mean_points(m.repealed, table.len()),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let mut datasets = vec![
        Dataset::default()
            .name("Įsigaliojo")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.series_style(LifecycleEvent::EnteredForce))
            .data(&entered),
        Dataset::default()
            .name("Neteko galios")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(theme.series_style(LifecycleEvent::Repealed))
            .data(&repealed),
    ];
    if means.is_some() {
        datasets.push(
            Dataset::default()
                .name("Vidurkis")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(theme.mean_style(LifecycleEvent::EnteredForce))
                .data(&entered_mean),
        );
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(theme.mean_style(LifecycleEvent::Repealed))
                .data(&repealed_mean),
        );
    }

    let periods: Vec<&str> = table.rows.iter().map(|r| r.period.as_str()).collect();
    let x_max = periods.len().saturating_sub(1).max(1) as f64;
    let y_max = y_upper_bound(table);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.separator)
                .title(Span::styled(format!(" {title} "), theme.header)),
        )
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, x_max])
                .labels(axis_labels(&periods).into_iter().map(Line::from).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(vec![
                    Line::from("0"),
                    Line::from(format!("{:.0}", y_max / 2.0)),
                    Line::from(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Bar chart of the running number of statutes in force.
pub fn render_cumulative_chart(
    frame: &mut Frame,
    area: Rect,
    points: &[CumulativePoint],
    theme: &Theme,
) {
    let values = cumulative_bars(points);
    let bars: Vec<Bar> = values
        .iter()
        .map(|(period, value)| {
            Bar::default()
                .value(*value)
                .label(Line::from(short_label(period)))
                .style(theme.cumulative_bar)
        })
        .collect();

    // Fit every bar into the inner width when possible.
    let inner = area.width.saturating_sub(2);
    let n = bars.len().max(1) as u16;
    let bar_width = (inner / n).saturating_sub(1).clamp(1, 6);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.separator)
                .title(Span::styled(" Galiojančių įstatymų skaičius ", theme.header)),
        )
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(theme.cumulative_bar)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

/// `"2021"` → `"'21"`, `"2021-Q3"` → `"'21Q3"` so narrow bars keep a
/// readable label. Anything that is not a period key is shown as is.
pub fn short_label(period: &str) -> String {
    match period.parse::<PeriodKey>() {
        Ok(key) => {
            let yy = key.year().rem_euclid(100);
            match key {
                PeriodKey::Year(_) => format!("'{yy:02}"),
                PeriodKey::Quarter { quarter, .. } => format!("'{yy:02}Q{quarter}"),
            }
        }
        Err(_) => period.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
