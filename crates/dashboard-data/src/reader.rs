//! CSV loading for the production and weather files.
//!
//! Columns are located by header name, so extraneous columns (record ids,
//! public URLs, installation dates) are never parsed. Every required cell
//! must parse: a single bad timestamp or measurement aborts the whole file,
//! since a partially loaded series would silently bias its monthly buckets.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::{ProductionRecord, WeatherRecord};
use dashboard_core::settings::{ProductionInput, WeatherInput};
use dashboard_core::time_utils::TimestampParser;
use tracing::{debug, info, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Open and parse the production file described by `input`.
pub fn load_production(
    input: &ProductionInput,
    parser: &TimestampParser,
) -> Result<Vec<ProductionRecord>> {
    let file = open(&input.path)?;
    read_production(file, input, parser)
}

/// Open and parse the weather file described by `input`.
pub fn load_weather(input: &WeatherInput, parser: &TimestampParser) -> Result<Vec<WeatherRecord>> {
    let file = open(&input.path)?;
    read_weather(file, input, parser)
}

/// Parse production rows from any reader. `input.path` is only used in
/// error messages.
///
/// Rows with a blank energy cell carry no reading and are skipped; any other
/// unparseable cell is an error.
pub fn read_production<R: Read>(
    source: R,
    input: &ProductionInput,
    parser: &TimestampParser,
) -> Result<Vec<ProductionRecord>> {
    let path = input.path.as_path();
    let mut reader = csv_reader(source);
    let headers = headers(&mut reader, path)?;

    let ts_idx = column_index(&headers, &input.timestamp_column, path)?;
    let kwh_idx = column_index(&headers, &input.value_column, path)?;
    log_ignored_columns(&headers, &[ts_idx, kwh_idx], path);

    let mut records = Vec::new();
    let mut blank_values = 0usize;

    for result in reader.records() {
        let row = result.map_err(|source| csv_error(path, source))?;
        let line = line_of(&row);
        let timestamp = parse_timestamp(&row, ts_idx, parser, path, line)?;

        match parse_measure(&row, kwh_idx, &input.value_column, path, line)? {
            Some(energy_kwh) => records.push(ProductionRecord {
                timestamp,
                energy_kwh,
            }),
            None => blank_values += 1,
        }
    }

    if blank_values > 0 {
        warn!(
            path = %path.display(),
            skipped = blank_values,
            "skipped production rows with a blank energy value"
        );
    }
    info!(path = %path.display(), rows = records.len(), "loaded production records");

    Ok(records)
}

/// Parse weather rows from any reader. `input.path` is only used in error
/// messages.
///
/// Blank temperature or daylight cells become `None`.
pub fn read_weather<R: Read>(
    source: R,
    input: &WeatherInput,
    parser: &TimestampParser,
) -> Result<Vec<WeatherRecord>> {
    let path = input.path.as_path();
    let mut reader = csv_reader(source);
    let headers = headers(&mut reader, path)?;

    let ts_idx = column_index(&headers, &input.timestamp_column, path)?;
    let temp_idx = column_index(&headers, &input.temperature_column, path)?;
    let daylight_idx = column_index(&headers, &input.daylight_column, path)?;
    log_ignored_columns(&headers, &[ts_idx, temp_idx, daylight_idx], path);

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result.map_err(|source| csv_error(path, source))?;
        let line = line_of(&row);

        records.push(WeatherRecord {
            timestamp: parse_timestamp(&row, ts_idx, parser, path, line)?,
            avg_temperature: parse_measure(&row, temp_idx, &input.temperature_column, path, line)?,
            daylight_hours: parse_measure(&row, daylight_idx, &input.daylight_column, path, line)?,
        });
    }

    let blank_temps = records.iter().filter(|r| r.avg_temperature.is_none()).count();
    let blank_daylight = records.iter().filter(|r| r.daylight_hours.is_none()).count();
    if blank_temps > 0 || blank_daylight > 0 {
        warn!(
            path = %path.display(),
            blank_temperature = blank_temps,
            blank_daylight = blank_daylight,
            "weather file has blank measurements; they are left out of monthly means"
        );
    }
    info!(path = %path.display(), rows = records.len(), "loaded weather records");

    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn csv_reader<R: Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(source)
}

fn csv_error(path: &Path, source: csv::Error) -> DashboardError {
    DashboardError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

fn headers<R: Read>(reader: &mut csv::Reader<R>, path: &Path) -> Result<StringRecord> {
    reader
        .headers()
        .cloned()
        .map_err(|source| csv_error(path, source))
}

/// Position of `name` in the header row. A UTF-8 byte-order mark on the
/// first header is ignored.
fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}') == name)
        .ok_or_else(|| DashboardError::MissingColumn {
            path: path.to_path_buf(),
            column: name.to_string(),
        })
}

fn log_ignored_columns(headers: &StringRecord, used: &[usize], path: &Path) {
    let ignored: Vec<&str> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| !used.contains(idx))
        .map(|(_, name)| name)
        .collect();
    if !ignored.is_empty() {
        debug!(path = %path.display(), ?ignored, "ignoring unused columns");
    }
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_timestamp(
    row: &StringRecord,
    idx: usize,
    parser: &TimestampParser,
    path: &Path,
    line: u64,
) -> Result<chrono::NaiveDateTime> {
    let raw = row.get(idx).unwrap_or("");
    parser
        .parse(raw)
        .ok_or_else(|| DashboardError::TimestampParse {
            path: path.to_path_buf(),
            line,
            value: raw.to_string(),
        })
}

/// Parse a numeric cell. Blank and `NaN` cells are missing values;
/// infinities are rejected like any other non-number.
fn parse_measure(
    row: &StringRecord,
    idx: usize,
    column: &str,
    path: &Path,
    line: u64,
) -> Result<Option<f64>> {
    let raw = row.get(idx).unwrap_or("").trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(DashboardError::ValueParse {
            path: path.to_path_buf(),
            line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
