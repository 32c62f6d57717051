use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the dashboard title.
pub const SUN: &str = "☀";

/// Dashboard title text.
pub const TITLE: &str = "CALGARY SOLAR ENERGY DASHBOARD";

/// Dashboard header rendering three lines:
///
/// 1. Title with sun decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Year window and timezone in `[ 2017–2022 | america/edmonton ]` format.
pub struct Header<'a> {
    /// Retention window, e.g. `"2017–2022"`.
    pub years: &'a str,
    /// Timezone naive timestamps were read in.
    pub timezone: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(years: &'a str, timezone: &'a str, theme: &'a Theme) -> Self {
        Self {
            years,
            timezone,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        vec![
            Line::from(vec![
                Span::styled(SUN, self.theme.header_accent),
                Span::styled(format!(" {TITLE} "), self.theme.header),
                Span::styled(SUN, self.theme.header_accent),
            ]),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.years, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_lowercase(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }

    /// Rows needed to draw the header.
    pub fn height(&self) -> u16 {
        3
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
