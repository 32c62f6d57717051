use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DashboardError, Result};
use crate::time_utils;

/// A single metering event read from the production file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Local wall-clock time of the reading.
    pub timestamp: NaiveDateTime,
    /// Energy produced, in kWh.
    pub energy_kwh: f64,
}

/// One day of observations read from the weather file.
///
/// Measurements are `None` when the source cell was blank; blanks are
/// excluded from monthly means rather than counted as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Local wall-clock time of the observation.
    pub timestamp: NaiveDateTime,
    /// Average air temperature in °C.
    #[serde(default)]
    pub avg_temperature: Option<f64>,
    /// Hours of daylight.
    #[serde(default)]
    pub daylight_hours: Option<f64>,
}

// ── SeriesSource / Aggregation ────────────────────────────────────────────────

/// Which monthly series a value (or a label) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Monthly kWh totals from the production file.
    Production,
    /// Monthly mean temperature from the weather file.
    Temperature,
    /// Monthly mean daylight hours from the weather file.
    Daylight,
}

impl SeriesSource {
    /// All sources in dashboard order.
    pub const ALL: [SeriesSource; 3] = [
        SeriesSource::Production,
        SeriesSource::Temperature,
        SeriesSource::Daylight,
    ];

    /// Lower-case identifier used in logs and serialised chart specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesSource::Production => "production",
            SeriesSource::Temperature => "temperature",
            SeriesSource::Daylight => "daylight",
        }
    }
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function applied to all values that fall into one monthly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    /// Arithmetic mean.
    Mean,
}

// ── MonthlyBucket ─────────────────────────────────────────────────────────────

/// A calendar month, identified by its first day.
///
/// The only constructors truncate to the first of the month, so two buckets
/// compare equal exactly when they denote the same month. Ordering follows
/// the start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthlyBucket {
    start: NaiveDate,
}

impl MonthlyBucket {
    /// Bucket for the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            start: time_utils::month_start(date),
        }
    }

    /// Bucket for the month containing `timestamp`.
    pub fn from_timestamp(timestamp: NaiveDateTime) -> Self {
        Self::containing(timestamp.date())
    }

    /// Bucket for `year`/`month`, or `None` when `month` is not 1–12.
    pub fn from_year_month(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|start| Self { start })
    }

    /// First day of the month.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the month.
    pub fn end(&self) -> NaiveDate {
        time_utils::month_end(self.start)
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Month number, 1–12.
    pub fn month(&self) -> u32 {
        self.start.month()
    }

    /// Full English month name, e.g. `"January"`.
    pub fn month_name(&self) -> &'static str {
        time_utils::month_name(self.start.month())
    }

    /// Four-digit year as a string, e.g. `"2022"`.
    pub fn year_label(&self) -> String {
        format!("{:04}", self.start.year())
    }
}

impl Serialize for MonthlyBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MonthlyBucket", 3)?;
        state.serialize_field("month_start", &self.start)?;
        state.serialize_field("month_name", self.month_name())?;
        state.serialize_field("year", &self.year_label())?;
        state.end()
    }
}

impl fmt::Display for MonthlyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start.format("%Y-%m"))
    }
}

// ── AggregatedSeries ──────────────────────────────────────────────────────────

/// One monthly value of an [`AggregatedSeries`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub bucket: MonthlyBucket,
    /// Result of the series' aggregation over the month.
    pub value: f64,
    /// Number of raw values that contributed.
    pub count: usize,
}

/// Monthly values for one (source, aggregation) pair, ascending by month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries {
    source: SeriesSource,
    aggregation: Aggregation,
    points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    /// Build a series, sorting `points` by bucket.
    ///
    /// Callers must not pass two points for the same bucket; the resampler
    /// guarantees this by construction.
    pub fn new(source: SeriesSource, aggregation: Aggregation, mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.bucket);
        debug_assert!(
            points.windows(2).all(|w| w[0].bucket < w[1].bucket),
            "duplicate bucket in {source} series"
        );
        Self {
            source,
            aggregation,
            points,
        }
    }

    pub fn source(&self) -> SeriesSource {
        self.source
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value for `bucket`, if the month is present.
    pub fn value_at(&self, bucket: MonthlyBucket) -> Option<f64> {
        self.points
            .binary_search_by_key(&bucket, |p| p.bucket)
            .ok()
            .map(|idx| self.points[idx].value)
    }

    /// Copy of this series keeping only points for which `keep` holds.
    pub fn retain(&self, keep: impl Fn(&SeriesPoint) -> bool) -> Self {
        Self {
            source: self.source,
            aggregation: self.aggregation,
            points: self.points.iter().filter(|p| keep(p)).cloned().collect(),
        }
    }
}

// ── JoinedTable ───────────────────────────────────────────────────────────────

/// Month-name and year labels as carried by one source series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodLabel {
    pub month_name: String,
    pub year: i32,
}

impl From<MonthlyBucket> for PeriodLabel {
    fn from(bucket: MonthlyBucket) -> Self {
        Self {
            month_name: bucket.month_name().to_string(),
            year: bucket.year(),
        }
    }
}

/// The labels of every joined source, kept apart so each view filter reads
/// its own column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLabels {
    pub production: PeriodLabel,
    pub temperature: PeriodLabel,
    pub daylight: PeriodLabel,
}

impl SourceLabels {
    pub fn get(&self, source: SeriesSource) -> &PeriodLabel {
        match source {
            SeriesSource::Production => &self.production,
            SeriesSource::Temperature => &self.temperature,
            SeriesSource::Daylight => &self.daylight,
        }
    }
}

/// One month present in all three series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    /// Join key.
    pub bucket: MonthlyBucket,
    /// Total production for the month.
    pub kwh: f64,
    /// Mean daily temperature for the month.
    pub avg_temperature: f64,
    /// Mean daylight hours for the month.
    pub daylight_hours: f64,
    pub labels: SourceLabels,
}

impl JoinedRow {
    /// Year label as carried by `source`.
    pub fn year(&self, source: SeriesSource) -> i32 {
        self.labels.get(source).year
    }

    /// Month-name label as carried by `source`.
    pub fn month_name(&self, source: SeriesSource) -> &str {
        &self.labels.get(source).month_name
    }
}

/// Inner join of the three monthly series, ascending by month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JoinedTable {
    rows: Vec<JoinedRow>,
}

impl JoinedTable {
    pub fn new(mut rows: Vec<JoinedRow>) -> Self {
        rows.sort_by_key(|r| r.bucket);
        Self { rows }
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years found in `source`'s year column, ascending.
    pub fn years(&self, source: SeriesSource) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(|r| r.year(source)).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    /// Latest year in `source`'s year column.
    pub fn max_year(&self, source: SeriesSource) -> Option<i32> {
        self.rows.iter().map(|r| r.year(source)).max()
    }
}

// ── FilteredView ──────────────────────────────────────────────────────────────

/// Rows of a [`JoinedTable`] whose `source` year equals `year`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    pub source: SeriesSource,
    pub year: i32,
    pub rows: Vec<&'a JoinedRow>,
}

impl FilteredView<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ── YearRange ─────────────────────────────────────────────────────────────────

/// Closed range of calendar years, `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Retention window of the Calgary datasets.
    pub const DEFAULT_MIN: i32 = 2017;
    pub const DEFAULT_MAX: i32 = 2022;

    pub fn new(min: i32, max: i32) -> Result<Self> {
        if min > max {
            return Err(DashboardError::InvalidYearRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
