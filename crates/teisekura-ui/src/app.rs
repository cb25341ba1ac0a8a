//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the view mode, the data manager and the last load
//! outcome. It reloads through the manager on `r` and cycles views on `Tab`.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame, Terminal,
};
use teisekura_core::TeisekuraError;
use teisekura_data::{DashboardData, RecordSource};
use teisekura_runtime::DataManager;

use crate::components::header::Header;
use crate::dashboard_view;
use crate::table_view;
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which view the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Summary cards and charts.
    Dashboard,
    /// Yearly period table.
    Yearly,
    /// Quarterly period table.
    Quarterly,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Dashboard, ViewMode::Yearly, ViewMode::Quarterly];

    /// The view `Tab` switches to.
    pub fn next(self) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Yearly,
            ViewMode::Yearly => ViewMode::Quarterly,
            ViewMode::Quarterly => ViewMode::Dashboard,
        }
    }

    /// The view `Shift+Tab` switches to.
    pub fn previous(self) -> Self {
        match self {
            ViewMode::Dashboard => ViewMode::Quarterly,
            ViewMode::Yearly => ViewMode::Dashboard,
            ViewMode::Quarterly => ViewMode::Yearly,
        }
    }

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Dashboard => "Apžvalga",
            ViewMode::Yearly => "Pagal metus",
            ViewMode::Quarterly => "Pagal ketvirčius",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::Dashboard => "dashboard",
            ViewMode::Yearly => "yearly",
            ViewMode::Quarterly => "quarterly",
        })
    }
}

impl FromStr for ViewMode {
    type Err = TeisekuraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(ViewMode::Dashboard),
            "yearly" => Ok(ViewMode::Yearly),
            "quarterly" => Ok(ViewMode::Quarterly),
            other => Err(TeisekuraError::Config(format!("unknown view: {other}"))),
        }
    }
}

// ── LoadState ─────────────────────────────────────────────────────────────────

/// Outcome of the most recent load.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(Box<DashboardData>),
    Failed(String),
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the Teisėkūra TUI.
pub struct App<S> {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// Upper bound on effective date requested from the source.
    pub cutoff: NaiveDate,
    /// Date the yearly / quarterly "previous period" lookups are relative to.
    pub today: NaiveDate,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    pub state: LoadState,
    manager: DataManager<S>,
    source_label: String,
}

impl<S: RecordSource> App<S> {
    pub fn new(
        theme: Theme,
        view_mode: ViewMode,
        cutoff: NaiveDate,
        today: NaiveDate,
        manager: DataManager<S>,
    ) -> Self {
        let source_label = manager.source_description();
        Self {
            theme,
            view_mode,
            cutoff,
            today,
            should_quit: false,
            state: LoadState::Loading,
            manager,
            source_label,
        }
    }

    // ── Data ──────────────────────────────────────────────────────────────────

    /// Load through the data manager and rebuild the dashboard quantities.
    ///
    /// A failure is kept in [`LoadState::Failed`] so it stays on screen.
    pub fn refresh(&mut self, force: bool) {
        match self.manager.get_data(self.cutoff, force) {
            Ok(table) => {
                tracing::info!(records = table.len(), "dashboard data ready");
                self.state = LoadState::Ready(Box::new(DashboardData::build(&table, self.today)));
            }
            Err(e) => {
                tracing::error!(error = %e, "could not load dashboard data");
                self.state = LoadState::Failed(e.to_string());
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.view_mode = self.view_mode.next(),
            KeyCode::BackTab => self.view_mode = self.view_mode.previous(),
            KeyCode::Char('1') => self.view_mode = ViewMode::Dashboard,
            KeyCode::Char('2') => self.view_mode = ViewMode::Yearly,
            KeyCode::Char('3') => self.view_mode = ViewMode::Quarterly,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                tracing::debug!("manual refresh");
                self.refresh(true);
            }
            _ => {}
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the TUI until `q`, `Q`, `Esc` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout. The first frame
    /// shows a loading notice while the initial (blocking) load runs.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        terminal.draw(|frame| self.render(frame))?;
        self.refresh(false);

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let header = Header::new(self.cutoff, &self.source_label, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), chunks[0]);
        frame.render_widget(Paragraph::new(self.tab_line()), chunks[1]);
        self.render_body(frame, chunks[2]);
        frame.render_widget(Paragraph::new(self.footer_line()), chunks[3]);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let data = match &self.state {
            LoadState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled("Kraunami registro duomenys…", self.theme.info)),
                    area,
                );
                return;
            }
            LoadState::Failed(message) => {
                table_view::render_error(frame, area, message, &self.theme);
                return;
            }
            LoadState::Ready(data) => data,
        };

        match self.view_mode {
            ViewMode::Dashboard => dashboard_view::render_dashboard(frame, area, data, &self.theme),
            ViewMode::Yearly if data.yearly.is_empty() => {
                table_view::render_no_data(frame, area, &self.theme)
            }
            ViewMode::Yearly => table_view::render_table_view(
                frame,
                area,
                ViewMode::Yearly.title(),
                &data.yearly,
                &self.theme,
            ),
            ViewMode::Quarterly if data.quarterly.is_empty() => {
                table_view::render_no_data(frame, area, &self.theme)
            }
            ViewMode::Quarterly => table_view::render_table_view(
                frame,
                area,
                ViewMode::Quarterly.title(),
                &data.quarterly,
                &self.theme,
            ),
        }
    }

    fn tab_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, mode) in ViewMode::ALL.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", self.theme.separator));
            }
            let style = if *mode == self.view_mode {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!("{} {}", i + 1, mode.title()), style));
        }
        Line::from(spans)
    }

    fn footer_line(&self) -> Line<'static> {
        let age = match self.manager.cache_age(self.cutoff) {
            Some(age) => format!("duomenys prieš {} min.", age.as_secs() / 60),
            None => "duomenys neįkelti".to_string(),
        };
        Line::from(vec![
            Span::styled("q išeiti · Tab vaizdas · r atnaujinti", self.theme.dim),
            Span::styled(format!("  [{age}]"), self.theme.dim),
        ])
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
