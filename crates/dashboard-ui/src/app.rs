//! Main application state and TUI event loop.
//!
//! [`App`] owns the theme, the dashboard state with its three year
//! selectors, and which selector has keyboard focus.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tracing::debug;

use dashboard_runtime::charts::ChartSpec;
use dashboard_runtime::controller::{DashboardState, FilterSlot};
use dashboard_runtime::data::pipeline::PipelineMetadata;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::year_selector::YearSelector;
use crate::themes::Theme;

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub state: DashboardState,
    /// Selector receiving ←/→.
    pub focus: FilterSlot,
    /// Timezone naive timestamps were interpreted in.
    pub timezone: String,
    /// Retention window, e.g. `"2017–2022"`.
    pub years: String,
    pub metadata: Option<PipelineMetadata>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, state: DashboardState, timezone: String, years: String) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            state,
            focus: FilterSlot::ProductionYear,
            timezone,
            years,
            metadata: None,
            should_quit: false,
        }
    }

    pub fn with_metadata(mut self, metadata: PipelineMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Esc` or `Ctrl+C`.
    ///
    /// Key events are polled with a 250 ms timeout; between polls the task
    /// yields so a surrounding `tokio::select!` can still observe signals.
    pub async fn run(mut self) -> io::Result<()> {
        let mut terminal = TerminalGuard::enter()?;
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }

            if self.should_quit {
                break;
            }
            tokio::task::yield_now().await;
        }

        terminal.leave()
    }

    /// Apply one key press. Returns `true` when anything visible changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let changed = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                false
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                false
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                self.focus = self.focus.next();
                true
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                self.focus = self.focus.prev();
                true
            }
            KeyCode::Left | KeyCode::Char('h') => self.state.step(self.focus, -1),
            KeyCode::Right | KeyCode::Char('l') => self.state.step(self.focus, 1),
            KeyCode::Home => self.state.select_first(self.focus),
            KeyCode::End => self.state.select_last(self.focus),
            _ => false,
        };
        if changed {
            debug!(
                focus = ?self.focus,
                year = ?self.state.slot(self.focus).year,
                "selection changed"
            );
        }
        changed
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the whole dashboard into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let header = Header::new(&self.years, &self.timezone, &self.theme);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header.height()),
                Constraint::Length(FilterSlot::ALL.len() as u16),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(frame.area());

        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);
        self.render_selectors(frame, chunks[1]);
        self.render_charts(frame, chunks[2]);
        frame.render_widget(Paragraph::new(self.footer_line()), chunks[3]);
    }

    fn render_selectors(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = FilterSlot::ALL
            .iter()
            .map(|&slot| {
                let state = self.state.slot(slot);
                YearSelector::new(
                    slot.label(),
                    &state.options,
                    state.year,
                    slot == self.focus,
                    &self.theme,
                )
                .to_line(area.width)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }

    /// 2 × 2 grid: bar and heatmap on top, the two scatter plots below.
    fn render_charts(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let halves = |r: Rect| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(r)
        };
        let top = halves(rows[0]);
        let bottom = halves(rows[1]);

        self.render_slot(frame, top[0], FilterSlot::ProductionYear);
        let heatmap = ChartSpec::Heatmap(self.state.heatmap().clone());
        chart_view::render_chart(frame, top[1], &heatmap, false, &self.theme);
        self.render_slot(frame, bottom[0], FilterSlot::TemperatureYear);
        self.render_slot(frame, bottom[1], FilterSlot::DaylightYear);
    }

    fn render_slot(&self, frame: &mut Frame, area: Rect, slot: FilterSlot) {
        chart_view::render_chart(
            frame,
            area,
            &self.state.slot(slot).chart,
            slot == self.focus,
            &self.theme,
        );
    }

    fn footer_line(&self) -> Line<'_> {
        let mut spans = vec![
            Span::styled("Tab", self.theme.value),
            Span::styled(" selector  ", self.theme.dim),
            Span::styled("←/→", self.theme.value),
            Span::styled(" year  ", self.theme.dim),
            Span::styled("Home/End", self.theme.value),
            Span::styled(" first/last  ", self.theme.dim),
            Span::styled("q", self.theme.value),
            Span::styled(" quit", self.theme.dim),
        ];
        if let Some(meta) = &self.metadata {
            spans.push(Span::styled(" │ ", self.theme.separator));
            spans.push(Span::styled(
                format!(
                    "{} months joined from {} + {} records, loaded in {:.2}s",
                    meta.joined_rows,
                    meta.production_records,
                    meta.weather_records,
                    meta.load_time_seconds + meta.transform_time_seconds
                ),
                self.theme.label,
            ));
        }
        Line::from(spans)
    }
}

// ── Terminal guard ────────────────────────────────────────────────────────────

/// Raw-mode alternate screen that is restored even when the loop is dropped
/// mid-flight.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    active: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    fn leave(mut self) -> io::Result<()> {
        self.active = false;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
            let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
            let _ = self.terminal.show_cursor();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
