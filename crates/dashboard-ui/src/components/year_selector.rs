//! Single-line year selector.
//!
//! Renders `Label: 2017 2018 … [2022]` when the full option list fits, and
//! falls back to a compact `Label: ◀ 2022 ▶` otherwise.

use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::themes::Theme;

pub const LEFT_ARROW: &str = "◀";
pub const RIGHT_ARROW: &str = "▶";

pub struct YearSelector<'a> {
    pub label: &'a str,
    pub options: &'a [i32],
    pub selected: Option<i32>,
    pub focused: bool,
    pub theme: &'a Theme,
}

impl<'a> YearSelector<'a> {
    pub fn new(
        label: &'a str,
        options: &'a [i32],
        selected: Option<i32>,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            label,
            options,
            selected,
            focused,
            theme,
        }
    }

    /// Render into at most `max_width` terminal columns.
    pub fn to_line(&self, max_width: u16) -> Line<'a> {
        let full = self.full_line();
        if line_width(&full) <= usize::from(max_width) {
            full
        } else {
            self.compact_line()
        }
    }

    fn prefix(&self) -> Vec<Span<'a>> {
        let marker = if self.focused { "▸ " } else { "  " };
        vec![
            Span::styled(marker, self.theme.border_style(self.focused)),
            Span::styled(format!("{}: ", self.label), self.theme.label),
        ]
    }

    fn full_line(&self) -> Line<'a> {
        let mut spans = self.prefix();
        if self.options.is_empty() {
            spans.push(Span::styled("no years", self.theme.dim));
            return Line::from(spans);
        }
        for (i, year) in self.options.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            if Some(*year) == self.selected {
                spans.push(Span::styled(
                    format!("[{year}]"),
                    self.theme.selected_style(self.focused),
                ));
            } else {
                spans.push(Span::styled(year.to_string(), self.theme.selector_option));
            }
        }
        Line::from(spans)
    }

    fn compact_line(&self) -> Line<'a> {
        let mut spans = self.prefix();
        let position = self
            .selected
            .and_then(|y| self.options.iter().position(|&o| o == y));
        let has_prev = position.is_some_and(|p| p > 0);
        let has_next = position.is_some_and(|p| p + 1 < self.options.len());
        let arrow_style = |enabled: bool| {
            if enabled {
                self.theme.text
            } else {
                self.theme.dim
            }
        };

        spans.push(Span::styled(LEFT_ARROW, arrow_style(has_prev)));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            self.selected
                .map(|y| y.to_string())
                .unwrap_or_else(|| "----".to_string()),
            self.theme.selected_style(self.focused),
        ));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(RIGHT_ARROW, arrow_style(has_next)));
        Line::from(spans)
    }
}

/// Display width of `line` in terminal columns.
pub fn line_width(line: &Line<'_>) -> usize {
    line.spans.iter().map(|s| s.content.as_ref().width()).sum()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
