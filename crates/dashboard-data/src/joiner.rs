//! Inner join of the three monthly series on their month-start key.

use dashboard_core::models::{
    AggregatedSeries, JoinedRow, JoinedTable, PeriodLabel, SeriesSource, SourceLabels,
};
use tracing::{debug, warn};

/// Join production, temperature and daylight series on month.
///
/// Only months present in all three series survive. Each row keeps the
/// month-name and year labels of every source separately. No common month
/// yields an empty table.
pub fn join_monthly(
    production: &AggregatedSeries,
    temperature: &AggregatedSeries,
    daylight: &AggregatedSeries,
) -> JoinedTable {
    for (series, expected) in [
        (production, SeriesSource::Production),
        (temperature, SeriesSource::Temperature),
        (daylight, SeriesSource::Daylight),
    ] {
        if series.source() != expected {
            warn!(
                expected = %expected,
                actual = %series.source(),
                "series passed in the wrong join position"
            );
        }
    }

    let rows: Vec<JoinedRow> = production
        .points()
        .iter()
        .filter_map(|p| {
            let avg_temperature = temperature.value_at(p.bucket)?;
            let daylight_hours = daylight.value_at(p.bucket)?;
            Some(JoinedRow {
                bucket: p.bucket,
                kwh: p.value,
                avg_temperature,
                daylight_hours,
                labels: SourceLabels {
                    production: PeriodLabel::from(p.bucket),
                    temperature: PeriodLabel::from(p.bucket),
                    daylight: PeriodLabel::from(p.bucket),
                },
            })
        })
        .collect();

    debug!(
        production = production.len(),
        temperature = temperature.len(),
        daylight = daylight.len(),
        joined = rows.len(),
        "joined monthly series"
    );
    if rows.is_empty() && !production.is_empty() {
        warn!("no month is common to all three series; the dashboard will be empty");
    }

    JoinedTable::new(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
