use crate::themes::Theme;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use teisekura_core::formatting::format_count;
use unicode_width::UnicodeWidthChar;

// ── MetricCard ───────────────────────────────────────────────────────────────

/// A labelled headline number, two lines tall.
///
/// ```text
/// Tebegaliojantys įstatymai
/// 1 234
/// ```
pub struct MetricCard<'a> {
    pub label: &'a str,
    pub value: u64,
    /// Maximum display width of the label; longer labels end in `…`.
    pub max_width: usize,
    pub theme: &'a Theme,
    value_style: Option<Style>,
}

impl<'a> MetricCard<'a> {
    pub fn new(label: &'a str, value: u64, max_width: usize, theme: &'a Theme) -> Self {
        Self {
            label,
            value,
            max_width,
            theme,
            value_style: None,
        }
    }

    /// Override the value colour (defaults to `theme.value`).
    pub fn value_style(mut self, style: Style) -> Self {
        self.value_style = Some(style);
        self
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(Span::styled(
                truncate_to_width(self.label, self.max_width),
                self.theme.label,
            )),
            Line::from(Span::styled(
                format_count(self.value),
                self.value_style.unwrap_or(self.theme.value),
            )),
        ]
    }
}

/// Cut `s` to at most `max_width` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use unicode_width::UnicodeWidthStr;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_metric_card_lines() {
        let theme = Theme::dark();
        let card = MetricCard::new("Galiojantys", 12_345, 40, &theme);
        let lines = card.to_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(text(&lines[0]), "Galiojantys");
        assert_eq!(text(&lines[1]), "12 345");
        assert_eq!(lines[1].spans[0].style, theme.value);
    }

    #[test]
    fn test_metric_card_value_style_override() {
        let theme = Theme::dark();
        let lines = MetricCard::new("Negaliojantys", 3, 40, &theme)
            .value_style(theme.series_repealed)
            .to_lines();
        assert_eq!(lines[1].spans[0].style, theme.series_repealed);
    }

    #[test]
    fn test_truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("įstatymai", 20), "įstatymai");
    }

    #[test]
    fn test_truncate_long_string() {
        let out = truncate_to_width("Nustojusių galioti įstatymų skaičius", 12);
        assert_eq!(out.width(), 12);
        assert!(out.ends_with('…'));
        assert!(out.starts_with("Nustojusių"));
    }

    #[test]
    fn test_truncate_zero_width() {
        assert_eq!(truncate_to_width("abc", 0), "");
    }
}
