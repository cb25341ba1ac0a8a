//! Dashboard view: summary cards, yearly and quarterly trend sections.
//!
//! ```text
//! ┌ summary ─────────────────────────────────────────────────────┐
//! │ scope note             │ in force       │ not in force        │
//! ├ yearly ───────────────────────────────────────────────────────┤
//! │ prev-year cards │ entered/repealed + means │ cumulative bars  │
//! ├ quarterly ────────────────────────────────────────────────────┤
//! │ prev-quarter    │ entered/repealed                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use teisekura_core::models::PeriodCountRow;
use teisekura_data::analysis::DashboardData;

use crate::components::charts::{render_cumulative_chart, render_trend_chart};
use crate::components::metric_card::MetricCard;
use crate::themes::Theme;

const SIDE_PANEL_WIDTH: u16 = 34;
const SUMMARY_HEIGHT: u16 = 4;

/// Sample description shown next to the summary cards.
pub const SCOPE_NOTE: &str = "Visi nuo 2014 m. Lietuvos Respublikos Seime įregistruoti ir \
                              kada nors galioję įstatymai. Šaltinis: teisės aktų registro \
                              atviri duomenys.";

/// Render the whole dashboard into `area`.
pub fn render_dashboard(frame: &mut Frame, area: Rect, data: &DashboardData, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(SUMMARY_HEIGHT),
            Constraint::Percentage(55),
            Constraint::Min(6),
        ])
        .split(area);

    render_summary(frame, rows[0], data, theme);
    render_yearly_section(frame, rows[1], data, theme);
    render_quarterly_section(frame, rows[2], data, theme);
}

fn render_summary(frame: &mut Frame, area: Rect, data: &DashboardData, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(SCOPE_NOTE, theme.dim)).wrap(Wrap { trim: true }),
        cols[0],
    );

    let width = cols[1].width as usize;
    let in_force = MetricCard::new(
        "Išleisti ir tebegaliojantys įstatymai",
        data.summary.in_force as u64,
        width,
        theme,
    )
    .value_style(theme.success);
    frame.render_widget(Paragraph::new(Text::from(in_force.to_lines())), cols[1]);

    let not_in_force = MetricCard::new(
        "Išleisti ir nustoję galioti įstatymai",
        data.summary.not_in_force as u64,
        cols[2].width as usize,
        theme,
    )
    .value_style(theme.error);
    frame.render_widget(Paragraph::new(Text::from(not_in_force.to_lines())), cols[2]);
}

/// Side panel with two cards describing one period row.
fn period_panel<'a>(
    title: &'a str,
    entered_label: &'a str,
    repealed_label: &'a str,
    row: &PeriodCountRow,
    width: usize,
    theme: &'a Theme,
) -> Paragraph<'a> {
    let mut lines = vec![
        Line::from(Span::styled(title, theme.header)),
        Line::from(Span::styled(row.period.clone(), theme.dim)),
        Line::from(""),
    ];
    lines.extend(
        MetricCard::new(entered_label, row.entered_count, width, theme)
            .value_style(theme.series_entered)
            .to_lines(),
    );
    lines.push(Line::from(""));
    lines.extend(
        MetricCard::new(repealed_label, row.repealed_count, width, theme)
            .value_style(theme.series_repealed)
            .to_lines(),
    );

    Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.separator),
    )
}

fn render_yearly_section(frame: &mut Frame, area: Rect, data: &DashboardData, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(SIDE_PANEL_WIDTH),
            Constraint::Percentage(50),
            Constraint::Min(10),
        ])
        .split(area);

    let inner_width = SIDE_PANEL_WIDTH.saturating_sub(2) as usize;
    frame.render_widget(
        period_panel(
            "Tendencija pagal metus",
            "Praėjusiais metais įsigaliojo",
            "Praėjusiais metais nustojo galioti",
            &data.previous_year,
            inner_width,
            theme,
        ),
        cols[0],
    );
    render_trend_chart(
        frame,
        cols[1],
        "Įstatymų skaičius",
        &data.yearly,
        Some(data.yearly_means),
        theme,
    );
    render_cumulative_chart(frame, cols[2], &data.cumulative, theme);
}

fn render_quarterly_section(frame: &mut Frame, area: Rect, data: &DashboardData, theme: &Theme) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDE_PANEL_WIDTH), Constraint::Min(10)])
        .split(area);

    let inner_width = SIDE_PANEL_WIDTH.saturating_sub(2) as usize;
    frame.render_widget(
        period_panel(
            "Tendencija pagal ketvirtį",
            "Praeitą ketvirtį įsigaliojo",
            "Praeitą ketvirtį nustojo galioti",
            &data.previous_quarter,
            inner_width,
            theme,
        ),
        cols[0],
    );
    render_trend_chart(frame, cols[1], "Pagal ketvirčius", &data.quarterly, None, theme);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
