//! Chart projection.
//!
//! Pure functions mapping a slice of the joined table (or the monthly
//! production series, for the heatmap) to a declarative chart description.
//! Descriptions are plain data: they serialise to JSON and compare with
//! `==`, and equal inputs always produce equal descriptions.

use std::collections::BTreeMap;

use dashboard_core::formatting::{format_hours, format_kwh, format_temperature};
use dashboard_core::models::{AggregatedSeries, FilteredView, JoinedRow};
use dashboard_core::time_utils::month_name;
use serde::{Serialize, Serializer};

// ── Colours ───────────────────────────────────────────────────────────────────

/// 24-bit colour. Serialises as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

/// Inferno control points, dark to bright.
const INFERNO: [Rgb; 10] = [
    Rgb::new(0x00, 0x00, 0x04),
    Rgb::new(0x1b, 0x0c, 0x41),
    Rgb::new(0x4a, 0x0c, 0x6b),
    Rgb::new(0x78, 0x1c, 0x6d),
    Rgb::new(0xa5, 0x2c, 0x60),
    Rgb::new(0xcf, 0x44, 0x46),
    Rgb::new(0xed, 0x69, 0x25),
    Rgb::new(0xfb, 0x9b, 0x06),
    Rgb::new(0xf7, 0xd1, 0x3d),
    Rgb::new(0xfc, 0xff, 0xa4),
];

/// Qualitative palette for categorical (per-month) colouring.
const QUALITATIVE: [Rgb; 10] = [
    Rgb::new(0x63, 0x6e, 0xfa),
    Rgb::new(0xef, 0x55, 0x3b),
    Rgb::new(0x00, 0xcc, 0x96),
    Rgb::new(0xab, 0x63, 0xfa),
    Rgb::new(0xff, 0xa1, 0x5a),
    Rgb::new(0x19, 0xd3, 0xf3),
    Rgb::new(0xff, 0x66, 0x92),
    Rgb::new(0xb6, 0xe8, 0x80),
    Rgb::new(0xff, 0x97, 0xff),
    Rgb::new(0xfe, 0xcb, 0x52),
];

/// Perceptually sequential colour scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    Inferno,
}

impl ColorScale {
    /// Colour at position `t` in `[0, 1]`; out-of-range input is clamped.
    pub fn sample(&self, t: f64) -> Rgb {
        let stops: &[Rgb] = match self {
            ColorScale::Inferno => &INFERNO,
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        if lower >= stops.len() - 1 {
            return stops[stops.len() - 1];
        }
        stops[lower].lerp(stops[lower + 1], scaled - lower as f64)
    }

    /// Colour for `value` within `[min, max]`.
    pub fn sample_range(&self, value: f64, min: f64, max: f64) -> Rgb {
        self.sample(normalise(value, min, max))
    }
}

/// Position of `value` in `[min, max]`; a degenerate range maps to the middle.
fn normalise(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        0.5
    } else {
        (value - min) / span
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

// ── Display options ───────────────────────────────────────────────────────────

/// Plot margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margin {
    pub left: u16,
    pub right: u16,
    pub top: u16,
    pub bottom: u16,
}

/// Presentation settings carried into every chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayOptions {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub font_family: String,
    pub font_size: u16,
    pub font_color: Rgb,
    pub background: Rgb,
    pub margin: Margin,
    pub color_scale: ColorScale,
    /// Diameter of the largest scatter marker.
    pub size_max: f64,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_title: String::new(),
            y_title: String::new(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            font_color: Rgb::new(0x55, 0x55, 0x55),
            background: Rgb::new(0xf9, 0xf9, 0xf9),
            margin: Margin {
                left: 40,
                right: 40,
                top: 40,
                bottom: 40,
            },
            color_scale: ColorScale::Inferno,
            size_max: 50.0,
        }
    }
}

impl DisplayOptions {
    fn titled(title: String, x_title: &str, y_title: &str) -> Self {
        Self {
            title,
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
            ..Self::default()
        }
    }

    /// Options for the monthly production bar chart of `year`.
    pub fn bar(year: Option<i32>) -> Self {
        Self::titled(
            format!("Monthly Solar Production ({})", year_text(year)),
            "Month",
            "Solar Production",
        )
    }

    /// Options for the month × year production heatmap.
    pub fn heatmap() -> Self {
        Self::titled(
            "Solar Production Patterns (Month vs Year)".to_string(),
            "Month",
            "Year",
        )
    }

    /// Options for the temperature scatter plot of `year`.
    pub fn temperature_scatter(year: Option<i32>) -> Self {
        Self::titled(
            format!("Solar Production vs Temperature ({})", year_text(year)),
            "Temperature (°C)",
            "Solar Production",
        )
    }

    /// Options for the daylight scatter plot of `year`.
    pub fn daylight_scatter(year: Option<i32>) -> Self {
        Self::titled(
            format!("Monthly Daylight Hours vs Solar Production ({})", year_text(year)),
            "Daylight Hours",
            "Solar Production",
        )
    }

    /// Preset options for a slice chart of `kind`.
    pub fn for_kind(kind: ChartKind, year: Option<i32>) -> Self {
        match kind {
            ChartKind::Bar => Self::bar(year),
            ChartKind::TemperatureScatter => Self::temperature_scatter(year),
            ChartKind::DaylightScatter => Self::daylight_scatter(year),
        }
    }
}

fn year_text(year: Option<i32>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "no data".to_string())
}

// ── Chart descriptions ────────────────────────────────────────────────────────

/// Charts drawn from a per-year slice of the joined table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    TemperatureScatter,
    DaylightScatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSpec {
    /// Month name.
    pub label: String,
    /// kWh.
    pub value: f64,
    pub color: Rgb,
    /// Formatted value shown on hover / above the bar.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub options: DisplayOptions,
    pub bars: Vec<BarSpec>,
    /// `(min, max)` of the bar values, `None` when there are no bars.
    pub value_range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSpec {
    pub options: DisplayOptions,
    /// Column labels, calendar order.
    pub months: Vec<String>,
    /// Row labels, ascending.
    pub years: Vec<String>,
    /// `cells[year][month]`; `None` where the series has no value.
    pub cells: Vec<Vec<Option<HeatCell>>>,
    pub value_range: Option<(f64, f64)>,
}

/// Which joined column feeds a scatter plot's x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterAxis {
    Temperature,
    Daylight,
}

impl ScatterAxis {
    pub fn value(&self, row: &JoinedRow) -> f64 {
        match self {
            ScatterAxis::Temperature => row.avg_temperature,
            ScatterAxis::Daylight => row.daylight_hours,
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            ScatterAxis::Temperature => format_temperature(value),
            ScatterAxis::Daylight => format_hours(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    /// Month name; also the colour category.
    pub label: String,
    pub x: f64,
    /// kWh.
    pub y: f64,
    /// Marker diameter, area-proportional to kWh.
    pub size: f64,
    pub color: Rgb,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub options: DisplayOptions,
    pub axis: ScatterAxis,
    pub points: Vec<ScatterPoint>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
}

/// Any chart the dashboard can draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChartSpec),
    Heatmap(HeatmapSpec),
    Scatter(ScatterSpec),
}

impl ChartSpec {
    pub fn options(&self) -> &DisplayOptions {
        match self {
            ChartSpec::Bar(spec) => &spec.options,
            ChartSpec::Heatmap(spec) => &spec.options,
            ChartSpec::Scatter(spec) => &spec.options,
        }
    }

    pub fn title(&self) -> &str {
        &self.options().title
    }

    /// `true` when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Bar(spec) => spec.bars.is_empty(),
            ChartSpec::Heatmap(spec) => spec.cells.iter().flatten().all(Option::is_none),
            ChartSpec::Scatter(spec) => spec.points.is_empty(),
        }
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Project `view` into a chart of `kind`.
///
/// Month labels come from the view's own source, so each chart reads the
/// label column its filter selected on.
pub fn project(view: &FilteredView<'_>, kind: ChartKind, options: &DisplayOptions) -> ChartSpec {
    match kind {
        ChartKind::Bar => ChartSpec::Bar(project_bar(view, options)),
        ChartKind::TemperatureScatter => {
            ChartSpec::Scatter(project_scatter(view, ScatterAxis::Temperature, options))
        }
        ChartKind::DaylightScatter => {
            ChartSpec::Scatter(project_scatter(view, ScatterAxis::Daylight, options))
        }
    }
}

/// One bar per month, coloured by kWh.
pub fn project_bar(view: &FilteredView<'_>, options: &DisplayOptions) -> BarChartSpec {
    let value_range = value_range(view.rows.iter().map(|r| r.kwh));
    let (lo, hi) = value_range.unwrap_or((0.0, 0.0));

    let bars = view
        .rows
        .iter()
        .map(|row| BarSpec {
            label: row.month_name(view.source).to_string(),
            value: row.kwh,
            color: options.color_scale.sample_range(row.kwh, lo, hi),
            text: format_kwh(row.kwh),
        })
        .collect();

    BarChartSpec {
        options: options.clone(),
        bars,
        value_range,
    }
}

/// Month × year grid over the whole monthly production series.
pub fn project_heatmap(series: &AggregatedSeries, options: &DisplayOptions) -> HeatmapSpec {
    let mut grid: BTreeMap<i32, BTreeMap<u32, f64>> = BTreeMap::new();
    for point in series.points() {
        *grid
            .entry(point.bucket.year())
            .or_default()
            .entry(point.bucket.month())
            .or_default() += point.value;
    }

    let mut present_months: Vec<u32> = grid.values().flat_map(|m| m.keys().copied()).collect();
    present_months.sort_unstable();
    present_months.dedup();

    let value_range = value_range(grid.values().flat_map(|m| m.values().copied()));
    let (lo, hi) = value_range.unwrap_or((0.0, 0.0));

    let cells = grid
        .values()
        .map(|months| {
            present_months
                .iter()
                .map(|m| {
                    months.get(m).map(|&value| HeatCell {
                        value,
                        color: options.color_scale.sample_range(value, lo, hi),
                    })
                })
                .collect()
        })
        .collect();

    HeatmapSpec {
        options: options.clone(),
        months: present_months
            .iter()
            .map(|&m| month_name(m).to_string())
            .collect(),
        years: grid.keys().map(|y| y.to_string()).collect(),
        cells,
        value_range,
    }
}

/// One point per month: `x` from `axis`, `y` = kWh.
pub fn project_scatter(
    view: &FilteredView<'_>,
    axis: ScatterAxis,
    options: &DisplayOptions,
) -> ScatterSpec {
    let max_kwh = view.rows.iter().map(|r| r.kwh).fold(0.0_f64, f64::max);

    let points = view
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let label = row.month_name(view.source).to_string();
            let x = axis.value(row);
            ScatterPoint {
                hover: format!("{}: {}, {}", label, axis.format(x), format_kwh(row.kwh)),
                label,
                x,
                y: row.kwh,
                size: marker_size(row.kwh, max_kwh, options.size_max),
                color: QUALITATIVE[idx % QUALITATIVE.len()],
            }
        })
        .collect();

    ScatterSpec {
        options: options.clone(),
        axis,
        points,
        x_range: value_range(view.rows.iter().map(|r| axis.value(r))),
        y_range: value_range(view.rows.iter().map(|r| r.kwh)),
    }
}

/// Area-proportional marker diameter; the largest value gets `size_max`.
fn marker_size(value: f64, max: f64, size_max: f64) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    size_max * (value.max(0.0) / max).sqrt()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::models::{
        Aggregation, JoinedTable, MonthlyBucket, SeriesPoint, SeriesSource, SourceLabels,
    };

    fn row(y: i32, m: u32, kwh: f64, temp: f64, daylight: f64) -> JoinedRow {
        let bucket = MonthlyBucket::from_year_month(y, m).unwrap();
        JoinedRow {
            bucket,
            kwh,
            avg_temperature: temp,
            daylight_hours: daylight,
            labels: SourceLabels {
                production: bucket.into(),
                temperature: bucket.into(),
                daylight: bucket.into(),
            },
        }
    }

    fn table() -> JoinedTable {
        JoinedTable::new(vec![
            row(2022, 1, 10.0, 5.0, 8.0),
            row(2022, 2, 20.0, -5.0, 9.0),
            row(2022, 3, 40.0, 1.0, 11.5),
        ])
    }

    fn view(table: &JoinedTable, source: SeriesSource) -> FilteredView<'_> {
        FilteredView {
            source,
            year: 2022,
            rows: table.rows().iter().collect(),
        }
    }

    // ── colours ───────────────────────────────────────────────────────────────

    #[test]
    fn test_inferno_endpoints() {
        assert_eq!(ColorScale::Inferno.sample(0.0).hex(), "#000004");
        assert_eq!(ColorScale::Inferno.sample(1.0).hex(), "#fcffa4");
        assert_eq!(ColorScale::Inferno.sample(-3.0), ColorScale::Inferno.sample(0.0));
        assert_eq!(ColorScale::Inferno.sample(f64::NAN), ColorScale::Inferno.sample(0.0));
    }

    #[test]
    fn test_inferno_brightens_monotonically() {
        let luminance = |c: Rgb| u32::from(c.r) + u32::from(c.g) + u32::from(c.b);
        let samples: Vec<u32> = (0..=20)
            .map(|i| luminance(ColorScale::Inferno.sample(f64::from(i) / 20.0)))
            .collect();
        assert!(samples.windows(2).all(|w| w[0] <= w[1]), "{samples:?}");
    }

    #[test]
    fn test_rgb_hex_is_lowercase_and_padded() {
        assert_eq!(Rgb::new(0xf9, 0xf9, 0xf9).hex(), "#f9f9f9");
        assert_eq!(Rgb::new(0x00, 0x0a, 0xB0).hex(), "#000ab0");
    }

    // ── bar ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_bar_one_bar_per_month() {
        let table = table();
        let spec = project_bar(&view(&table, SeriesSource::Production), &DisplayOptions::bar(Some(2022)));

        let labels: Vec<&str> = spec.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["January", "February", "March"]);
        assert_eq!(spec.bars[1].text, "20.00 kWh");
        assert_eq!(spec.value_range, Some((10.0, 40.0)));
        assert_eq!(spec.options.title, "Monthly Solar Production (2022)");
    }

    #[test]
    fn test_bar_colour_scales_with_kwh() {
        let table = table();
        let spec = project_bar(&view(&table, SeriesSource::Production), &DisplayOptions::bar(Some(2022)));

        assert_eq!(spec.bars[0].color, ColorScale::Inferno.sample(0.0));
        assert_eq!(spec.bars[2].color, ColorScale::Inferno.sample(1.0));
    }

    #[test]
    fn test_bar_empty_view() {
        let table = table();
        let empty = FilteredView {
            source: SeriesSource::Production,
            year: 2021,
            rows: vec![],
        };
        let spec = project(&empty, ChartKind::Bar, &DisplayOptions::bar(Some(2021)));
        assert!(spec.is_empty());
        assert!(!table.is_empty());
    }

    // ── heatmap ───────────────────────────────────────────────────────────────

    #[test]
    fn test_heatmap_grid_layout() {
        let points = vec![
            (2020, 12, 5.0),
            (2021, 1, 7.0),
            (2021, 6, 90.0),
            (2020, 6, 80.0),
        ]
        .into_iter()
        .map(|(y, m, value)| SeriesPoint {
            bucket: MonthlyBucket::from_year_month(y, m).unwrap(),
            value,
            count: 30,
        })
        .collect();
        let series = AggregatedSeries::new(SeriesSource::Production, Aggregation::Sum, points);

        let spec = project_heatmap(&series, &DisplayOptions::heatmap());

        assert_eq!(spec.months, vec!["January", "June", "December"]);
        assert_eq!(spec.years, vec!["2020", "2021"]);
        assert!(spec.cells[0][0].is_none());
        assert_eq!(spec.cells[0][1].as_ref().unwrap().value, 80.0);
        assert_eq!(spec.cells[0][2].as_ref().unwrap().value, 5.0);
        assert_eq!(spec.cells[1][1].as_ref().unwrap().value, 90.0);
        assert!(spec.cells[1][2].is_none());
        assert_eq!(spec.value_range, Some((5.0, 90.0)));
        assert_eq!(spec.cells[1][1].as_ref().unwrap().color.hex(), "#fcffa4");
    }

    #[test]
    fn test_heatmap_empty_series() {
        let series = AggregatedSeries::new(SeriesSource::Production, Aggregation::Sum, vec![]);
        let spec = ChartSpec::Heatmap(project_heatmap(&series, &DisplayOptions::heatmap()));
        assert!(spec.is_empty());
    }

    // ── scatter ───────────────────────────────────────────────────────────────

    #[test]
    fn test_scatter_axes_and_sizes() {
        let table = table();
        let spec = project_scatter(
            &view(&table, SeriesSource::Temperature),
            ScatterAxis::Temperature,
            &DisplayOptions::temperature_scatter(Some(2022)),
        );

        assert_eq!(spec.points.len(), 3);
        assert_eq!(spec.points[1].x, -5.0);
        assert_eq!(spec.points[1].y, 20.0);
        assert!((spec.points[2].size - 50.0).abs() < 1e-9);
        assert!((spec.points[0].size - 25.0).abs() < 1e-9);
        assert_eq!(spec.points[0].hover, "January: 5.0 °C, 10.00 kWh");
        assert_eq!(spec.x_range, Some((-5.0, 5.0)));
    }

    #[test]
    fn test_scatter_daylight_axis_and_distinct_colours() {
        let table = table();
        let spec = project(
            &view(&table, SeriesSource::Daylight),
            ChartKind::DaylightScatter,
            &DisplayOptions::daylight_scatter(Some(2022)),
        );
        let ChartSpec::Scatter(scatter) = spec else {
            panic!("expected scatter");
        };
        assert_eq!(scatter.axis, ScatterAxis::Daylight);
        assert_eq!(scatter.points[2].x, 11.5);
        assert_ne!(scatter.points[0].color, scatter.points[1].color);
        assert_eq!(
            scatter.options.title,
            "Monthly Daylight Hours vs Solar Production (2022)"
        );
    }

    #[test]
    fn test_scatter_labels_follow_view_source() {
        let mut rows = vec![row(2022, 5, 1.0, 10.0, 15.0)];
        rows[0].labels.daylight.month_name = "Mayo".to_string();
        let table = JoinedTable::new(rows);

        let daylight = project_scatter(
            &view(&table, SeriesSource::Daylight),
            ScatterAxis::Daylight,
            &DisplayOptions::default(),
        );
        let temperature = project_scatter(
            &view(&table, SeriesSource::Temperature),
            ScatterAxis::Temperature,
            &DisplayOptions::default(),
        );
        assert_eq!(daylight.points[0].label, "Mayo");
        assert_eq!(temperature.points[0].label, "May");
    }

    // ── determinism / serialisation ───────────────────────────────────────────

    #[test]
    fn test_projection_is_deterministic() {
        let table = table();
        let options = DisplayOptions::temperature_scatter(Some(2022));
        let a = project(&view(&table, SeriesSource::Temperature), ChartKind::TemperatureScatter, &options);
        let b = project(&view(&table, SeriesSource::Temperature), ChartKind::TemperatureScatter, &options);

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_chart_spec_json_shape() {
        let table = table();
        let spec = project(
            &view(&table, SeriesSource::Production),
            ChartKind::Bar,
            &DisplayOptions::bar(Some(2022)),
        );
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["kind"], "bar");
        assert_eq!(json["options"]["background"], "#f9f9f9");
        assert_eq!(json["options"]["font_family"], "Arial, sans-serif");
        assert_eq!(json["bars"][0]["label"], "January");
    }

    #[test]
    fn test_options_without_year() {
        assert_eq!(
            DisplayOptions::for_kind(ChartKind::Bar, None).title,
            "Monthly Solar Production (no data)"
        );
    }
}
