//! Terminal rendering of chart descriptions.
//!
//! Each chart is drawn inside a bordered panel whose border lights up when
//! the panel's year selector has focus. The bottom line of every panel names
//! the axes.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType,
        LegendPosition, Paragraph, Row, Table,
    },
    Frame,
};

use dashboard_core::formatting::{format_compact, format_number};
use dashboard_runtime::charts::{
    BarChartSpec, ChartSpec, DisplayOptions, HeatmapSpec, Rgb, ScatterSpec,
};

use crate::themes::Theme;

const LEGEND_STEPS: usize = 10;

/// Render any chart, or the empty placeholder when it has no data.
pub fn render_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, focused: bool, theme: &Theme) {
    if spec.is_empty() {
        render_no_data(frame, area, spec.title(), focused, theme);
        return;
    }
    match spec {
        ChartSpec::Bar(bar) => render_bar_chart(frame, area, bar, focused, theme),
        ChartSpec::Heatmap(heatmap) => render_heatmap(frame, area, heatmap, focused, theme),
        ChartSpec::Scatter(scatter) => render_scatter(frame, area, scatter, focused, theme),
    }
}

// ── Bar ───────────────────────────────────────────────────────────────────────

pub fn render_bar_chart(
    frame: &mut Frame,
    area: Rect,
    spec: &BarChartSpec,
    focused: bool,
    theme: &Theme,
) {
    let inner = render_panel(frame, area, &spec.options.title, focused, theme);
    let (plot, caption) = split_caption(inner);

    let bars: Vec<Bar> = spec
        .bars
        .iter()
        .map(|b| {
            Bar::default()
                .value(b.value.max(0.0).round() as u64)
                .label(Line::from(short_month(&b.label)))
                .text_value(format_compact(b.value))
                .style(Style::default().fg(to_color(b.color)))
                .value_style(
                    Style::default()
                        .fg(contrast_text(b.color))
                        .bg(to_color(b.color)),
                )
        })
        .collect();

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width(plot.width, bars.len()))
        .bar_gap(1)
        .label_style(theme.axis);
    frame.render_widget(chart, plot);

    let range = spec
        .value_range
        .map(|(lo, hi)| format!("{} – {} kWh", format_compact(lo), format_compact(hi)));
    frame.render_widget(Paragraph::new(axis_caption(&spec.options, range, theme)), caption);
}

/// Widest bar that fits `count` bars with a one-column gap into `width`.
fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 1;
    }
    let per_bar = (usize::from(width) + 1) / count;
    per_bar.saturating_sub(1).clamp(1, 9) as u16
}

// ── Heatmap ───────────────────────────────────────────────────────────────────

pub fn render_heatmap(
    frame: &mut Frame,
    area: Rect,
    spec: &HeatmapSpec,
    focused: bool,
    theme: &Theme,
) {
    let inner = render_panel(frame, area, &spec.options.title, focused, theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let header = Row::new(
        std::iter::once(Cell::from(spec.options.y_title.clone()).style(theme.label)).chain(
            spec.months
                .iter()
                .map(|m| Cell::from(short_month(m)).style(theme.label)),
        ),
    );

    let rows: Vec<Row> = spec
        .years
        .iter()
        .zip(&spec.cells)
        .map(|(year, cells)| {
            let mut row_cells = vec![Cell::from(year.clone()).style(theme.label)];
            row_cells.extend(cells.iter().map(|cell| match cell {
                Some(c) => Cell::from(format_compact(c.value)).style(
                    Style::default()
                        .bg(to_color(c.color))
                        .fg(contrast_text(c.color)),
                ),
                None => Cell::from("·").style(theme.dim),
            }));
            Row::new(row_cells)
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(6))
        .chain(spec.months.iter().map(|_| Constraint::Fill(1)))
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(0)
        .style(theme.text);
    frame.render_widget(table, chunks[0]);

    frame.render_widget(Paragraph::new(heatmap_legend(spec, theme)), chunks[1]);
}

/// `min ▇▇▇▇▇▇▇▇▇▇ max kWh` with the colour scale as the gradient.
fn heatmap_legend<'a>(spec: &HeatmapSpec, theme: &Theme) -> Line<'a> {
    let Some((lo, hi)) = spec.value_range else {
        return Line::from(Span::styled("no data", theme.dim));
    };
    let mut spans = vec![Span::styled(format!("{} ", format_compact(lo)), theme.label)];
    spans.extend((0..LEGEND_STEPS).map(|i| {
        let t = i as f64 / (LEGEND_STEPS - 1) as f64;
        Span::styled(
            " ",
            Style::default().bg(to_color(spec.options.color_scale.sample(t))),
        )
    }));
    spans.push(Span::styled(format!(" {} kWh", format_compact(hi)), theme.label));
    Line::from(spans)
}

// ── Scatter ───────────────────────────────────────────────────────────────────

pub fn render_scatter(
    frame: &mut Frame,
    area: Rect,
    spec: &ScatterSpec,
    focused: bool,
    theme: &Theme,
) {
    let inner = render_panel(frame, area, &spec.options.title, focused, theme);
    let (plot, caption) = split_caption(inner);

    // Dataset borrows its points, so coordinates must outlive the chart.
    let coords: Vec<[(f64, f64); 1]> = spec.points.iter().map(|p| [(p.x, p.y)]).collect();
    let datasets: Vec<Dataset> = spec
        .points
        .iter()
        .zip(&coords)
        .map(|(p, xy)| {
            Dataset::default()
                .name(short_month(&p.label))
                .marker(marker_for(p.size, spec.options.size_max))
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(to_color(p.color)))
                .data(xy.as_slice())
        })
        .collect();

    let (x_lo, x_hi) = padded(spec.x_range.unwrap_or((0.0, 1.0)));
    let y_hi = spec.y_range.map_or(1.0, |(_, hi)| (hi * 1.1).max(1.0));
    let y_lo = spec.y_range.map_or(0.0, |(lo, _)| lo.min(0.0));

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([x_lo, x_hi])
                .labels(vec![
                    format_number(x_lo, 1),
                    format_number((x_lo + x_hi) / 2.0, 1),
                    format_number(x_hi, 1),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([y_lo, y_hi])
                .labels(vec![
                    format_compact(y_lo),
                    format_compact((y_lo + y_hi) / 2.0),
                    format_compact(y_hi),
                ]),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)));
    frame.render_widget(chart, plot);

    frame.render_widget(Paragraph::new(axis_caption(&spec.options, None, theme)), caption);
}

/// Bucket an area-scaled marker diameter into a terminal glyph.
fn marker_for(size: f64, size_max: f64) -> Marker {
    let ratio = if size_max > 0.0 { size / size_max } else { 0.0 };
    if ratio >= 0.75 {
        Marker::Block
    } else if ratio >= 0.4 {
        Marker::HalfBlock
    } else {
        Marker::Dot
    }
}

/// Widen `(lo, hi)` by ten percent on each side, at least half a unit.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let pad = ((hi - lo) * 0.1).max(0.5);
    (lo - pad, hi + pad)
}

// ── Placeholder ───────────────────────────────────────────────────────────────

/// Empty panel shown when a selection has no rows.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, focused: bool, theme: &Theme) {
    let inner = render_panel(frame, area, title, focused, theme);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data for this selection", theme.warning)),
        Line::from(Span::styled(
            "Pick another year with ←/→ or check the input files.",
            theme.dim,
        )),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Draw the bordered panel and return the area inside it.
fn render_panel(frame: &mut Frame, area: Rect, title: &str, focused: bool, theme: &Theme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(Span::styled(format!(" {title} "), theme.title));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

fn split_caption(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

fn axis_caption<'a>(options: &DisplayOptions, extra: Option<String>, theme: &Theme) -> Line<'a> {
    let mut spans = vec![
        Span::styled("x: ", theme.dim),
        Span::styled(options.x_title.clone(), theme.label),
        Span::styled("  y: ", theme.dim),
        Span::styled(options.y_title.clone(), theme.label),
    ];
    if let Some(extra) = extra {
        spans.push(Span::styled(format!("  ({extra})"), theme.dim));
    }
    Line::from(spans)
}

pub fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Black or white, whichever reads better on `background`.
fn contrast_text(background: Rgb) -> Color {
    let luma = 0.299 * f64::from(background.r)
        + 0.587 * f64::from(background.g)
        + 0.114 * f64::from(background.b);
    if luma > 140.0 {
        Color::Black
    } else {
        Color::White
    }
}

fn short_month(name: &str) -> String {
    name.chars().take(3).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::{
        Aggregation, AggregatedSeries, FilteredView, JoinedRow, JoinedTable, MonthlyBucket,
        SeriesPoint, SeriesSource, SourceLabels,
    };
    use dashboard_runtime::charts::{project, project_heatmap, ChartKind};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn row(m: u32, kwh: f64) -> JoinedRow {
        let bucket = MonthlyBucket::from_year_month(2022, m).unwrap();
        JoinedRow {
            bucket,
            kwh,
            avg_temperature: f64::from(m) * 2.0 - 10.0,
            daylight_hours: 8.0 + f64::from(m) * 0.5,
            labels: SourceLabels {
                production: bucket.into(),
                temperature: bucket.into(),
                daylight: bucket.into(),
            },
        }
    }

    fn table() -> JoinedTable {
        JoinedTable::new((1..=12).map(|m| row(m, f64::from(m) * 100.0)).collect())
    }

    fn chart(table: &JoinedTable, kind: ChartKind, source: SeriesSource) -> ChartSpec {
        let view = FilteredView {
            source,
            year: 2022,
            rows: table.rows().iter().collect(),
        };
        project(&view, kind, &DisplayOptions::for_kind(kind, Some(2022)))
    }

    fn draw(width: u16, height: u16, spec: &ChartSpec) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let theme = Theme::dark();
        terminal
            .draw(|frame| render_chart(frame, frame.area(), spec, true, &theme))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── helpers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_bar_width() {
        assert_eq!(bar_width(60, 12), 4);
        assert_eq!(bar_width(5, 12), 1);
        assert_eq!(bar_width(200, 2), 9);
        assert_eq!(bar_width(10, 0), 1);
    }

    #[test]
    fn test_marker_buckets() {
        assert_eq!(marker_for(50.0, 50.0), Marker::Block);
        assert_eq!(marker_for(25.0, 50.0), Marker::HalfBlock);
        assert_eq!(marker_for(5.0, 50.0), Marker::Dot);
        assert_eq!(marker_for(5.0, 0.0), Marker::Dot);
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(contrast_text(Rgb::new(0, 0, 4)), Color::White);
        assert_eq!(contrast_text(Rgb::new(0xfc, 0xff, 0xa4)), Color::Black);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded((0.0, 10.0)), (-1.0, 11.0));
        assert_eq!(padded((3.0, 3.0)), (2.5, 3.5));
    }

    // ── rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_bar_chart() {
        let table = table();
        let out = draw(100, 20, &chart(&table, ChartKind::Bar, SeriesSource::Production));
        assert!(out.contains("Monthly Solar Production (2022)"));
        assert!(out.contains("Jan"));
        assert!(out.contains("x: Month"));
    }

    #[test]
    fn test_render_scatter_charts() {
        let table = table();
        let temperature = draw(
            100,
            24,
            &chart(&table, ChartKind::TemperatureScatter, SeriesSource::Temperature),
        );
        assert!(temperature.contains("Solar Production vs Temperature (2022)"));
        assert!(temperature.contains("x: Temperature (°C)"));

        let daylight = draw(
            100,
            24,
            &chart(&table, ChartKind::DaylightScatter, SeriesSource::Daylight),
        );
        assert!(daylight.contains("Daylight Hours"));
    }

    #[test]
    fn test_render_heatmap() {
        let points = (2020..=2022)
            .flat_map(|y| (1..=12).map(move |m| (y, m)))
            .map(|(y, m)| SeriesPoint {
                bucket: MonthlyBucket::from_year_month(y, m).unwrap(),
                value: f64::from(m) * 10.0,
                count: 1,
            })
            .collect();
        let series = AggregatedSeries::new(SeriesSource::Production, Aggregation::Sum, points);
        let spec = ChartSpec::Heatmap(project_heatmap(&series, &DisplayOptions::heatmap()));

        let out = draw(120, 12, &spec);
        assert!(out.contains("Solar Production Patterns (Month vs Year)"));
        assert!(out.contains("2021"));
        assert!(out.contains("Dec"));
        assert!(out.contains("kWh"));
    }

    #[test]
    fn test_render_empty_chart_shows_placeholder() {
        let empty = JoinedTable::default();
        let out = draw(80, 10, &chart(&empty, ChartKind::Bar, SeriesSource::Production));
        assert!(out.contains("No data for this selection"));
    }

    #[test]
    fn test_render_in_tiny_area_does_not_panic() {
        let table = table();
        for (kind, source) in [
            (ChartKind::Bar, SeriesSource::Production),
            (ChartKind::TemperatureScatter, SeriesSource::Temperature),
        ] {
            draw(6, 3, &chart(&table, kind, source));
        }
    }
}
