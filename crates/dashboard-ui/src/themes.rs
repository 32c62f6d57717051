use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are dark, 7–15 light. Anything else falls back to dark.
pub fn detect_background() -> BackgroundType {
    background_from(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_from(colorfgbg: Option<&str>) -> BackgroundType {
    colorfgbg
        .and_then(|val| val.split(';').next_back())
        .and_then(|bg| bg.parse::<u8>().ok())
        .map(|bg| {
            if bg <= 6 {
                BackgroundType::Dark
            } else {
                BackgroundType::Light
            }
        })
        .unwrap_or(BackgroundType::Dark)
}

/// Styles used by the dashboard widgets.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,
    pub warning: Style,

    // ── Panels ───────────────────────────────────────────────────────────────
    pub border: Style,
    pub border_focused: Style,
    pub title: Style,
    pub axis: Style,

    // ── Selectors ────────────────────────────────────────────────────────────
    pub selector_option: Style,
    pub selector_selected: Style,
    pub selector_selected_focused: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::LightRed),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            warning: Style::default().fg(Color::Yellow),

            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Yellow),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::Gray),

            selector_option: Style::default().fg(Color::DarkGray),
            selector_selected: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            selector_selected_focused: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            warning: Style::default().fg(Color::Red),

            border: Style::default().fg(Color::Gray),
            border_focused: Style::default().fg(Color::Red),
            title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            axis: Style::default().fg(Color::DarkGray),

            selector_option: Style::default().fg(Color::Gray),
            selector_selected: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            selector_selected_focused: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            BackgroundType::Dark => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Panel border style.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border
        }
    }

    /// Style of the selected year in a selector.
    pub fn selected_style(&self, focused: bool) -> Style {
        if focused {
            self.selector_selected_focused
        } else {
            self.selector_selected
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
