//! Period table views (yearly / quarterly) and the placeholder panels.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per period
//! plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use teisekura_core::formatting;
use teisekura_core::models::{PeriodCountRow, PeriodCountTable};

use crate::themes::Theme;

/// Entered minus repealed for one row.
pub fn net_change(row: &PeriodCountRow) -> i64 {
    row.entered_count as i64 - row.repealed_count as i64
}

/// Render a period table into `area` with a totals row.
pub fn render_table_view(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    table: &PeriodCountTable,
    theme: &Theme,
) {
    let header_cells = ["Laikotarpis", "Įsigaliojo", "Neteko galios", "Pokytis"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let data_rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            let net = net_change(row);
            Row::new(vec![
                Cell::from(row.period.clone()),
                Cell::from(formatting::format_count(row.entered_count)),
                Cell::from(formatting::format_count(row.repealed_count)),
                Cell::from(formatting::format_signed(net)).style(theme.delta_style(net)),
            ])
            .style(style)
        })
        .collect();

    let (entered, repealed) = table.totals();
    let net = entered as i64 - repealed as i64;
    let total_row = Row::new(vec![
        Cell::from(format!("IŠ VISO ({})", table.len())),
        Cell::from(formatting::format_count(entered)),
        Cell::from(formatting::format_count(repealed)),
        Cell::from(formatting::format_signed(net)),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Length(15),
        Constraint::Length(10),
    ];

    let widget = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(widget, area);
}

/// Render a "no data" placeholder when the table has no periods.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Duomenų nerasta", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Registras negrąžino nė vieno įstatymo iki pasirinktos datos.",
            theme.dim,
        )),
        Line::from(Span::styled("Spauskite 'q' arba Ctrl+C išeiti", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .block(Block::default().borders(Borders::ALL).title(" Teisėkūra ")),
        area,
    );
}

/// Render a load failure. The message is shown verbatim.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Nepavyko įkelti duomenų", theme.error)),
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.text)),
        Line::from(""),
        Line::from(Span::styled(
            "Spauskite 'r' bandyti dar kartą arba 'q' išeiti",
            theme.dim,
        )),
    ];
    frame.render_widget(
        Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.error)
                    .title(" Klaida "),
            ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
