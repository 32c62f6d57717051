//! Year-based filtering of monthly series and the joined table.

use dashboard_core::models::{
    AggregatedSeries, FilteredView, JoinedTable, SeriesSource, YearRange,
};

/// Keep the points of `series` whose bucket year lies in `range`.
pub fn retain_years(series: &AggregatedSeries, range: YearRange) -> AggregatedSeries {
    series.retain(|p| range.contains(p.bucket.year()))
}

/// Keep the rows of `table` whose bucket year lies in `range`.
pub fn retain_table_years(table: &JoinedTable, range: YearRange) -> JoinedTable {
    JoinedTable::new(
        table
            .rows()
            .iter()
            .filter(|r| range.contains(r.bucket.year()))
            .cloned()
            .collect(),
    )
}

/// Rows whose `source` year label equals `year`. An absent year gives an
/// empty view.
pub fn select_year(table: &JoinedTable, source: SeriesSource, year: i32) -> FilteredView<'_> {
    FilteredView {
        source,
        year,
        rows: table.rows().iter().filter(|r| r.year(source) == year).collect(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_core::models::{Aggregation, JoinedRow, MonthlyBucket, SeriesPoint, SourceLabels};

    /// One point per month, January 2015 through December 2024.
    fn synthetic_series() -> AggregatedSeries {
        let points = (2015..=2024)
            .flat_map(|y| (1..=12).map(move |m| (y, m)))
            .map(|(y, m)| SeriesPoint {
                bucket: MonthlyBucket::from_year_month(y, m).unwrap(),
                value: f64::from(m),
                count: 1,
            })
            .collect();
        AggregatedSeries::new(SeriesSource::Production, Aggregation::Sum, points)
    }

    fn row(y: i32, m: u32) -> JoinedRow {
        let bucket = MonthlyBucket::from_year_month(y, m).unwrap();
        JoinedRow {
            bucket,
            kwh: 1.0,
            avg_temperature: 0.0,
            daylight_hours: 12.0,
            labels: SourceLabels {
                production: bucket.into(),
                temperature: bucket.into(),
                daylight: bucket.into(),
            },
        }
    }

    // ── retain_years ──────────────────────────────────────────────────────────

    #[test]
    fn test_default_window_keeps_exactly_2017_to_2022() {
        let kept = retain_years(&synthetic_series(), YearRange::default());

        let mut years: Vec<i32> = kept.points().iter().map(|p| p.bucket.year()).collect();
        years.dedup();
        assert_eq!(years, vec![2017, 2018, 2019, 2020, 2021, 2022]);
        assert_eq!(kept.len(), 6 * 12);
        assert!(kept.points().iter().all(|p| p.bucket.year() != 2016));
        assert!(kept.points().iter().all(|p| p.bucket.year() != 2023));
    }

    #[test]
    fn test_window_matches_exclusive_month_end_date_range() {
        // Legacy production window: month-end label > 2016-12-31
        // and < 2023-01-31.
        let after = NaiveDate::from_ymd_opt(2016, 12, 31).unwrap();
        let before = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let range = YearRange::default();

        for point in synthetic_series().points() {
            let end = point.bucket.end();
            let legacy = end > after && end < before;
            assert_eq!(
                legacy,
                range.contains(point.bucket.year()),
                "disagreement at {}",
                point.bucket
            );
        }
    }

    #[test]
    fn test_window_matches_lexicographic_year_range() {
        // Legacy weather window: year string > "2016" and < "2023".
        let range = YearRange::default();

        for point in synthetic_series().points() {
            let label = point.bucket.year_label();
            let legacy = label.as_str() > "2016" && label.as_str() < "2023";
            assert_eq!(legacy, range.contains(point.bucket.year()));
        }
    }

    #[test]
    fn test_window_on_empty_series() {
        let empty = AggregatedSeries::new(SeriesSource::Daylight, Aggregation::Mean, vec![]);
        assert!(retain_years(&empty, YearRange::default()).is_empty());
    }

    #[test]
    fn test_retain_table_years() {
        let table = JoinedTable::new(vec![row(2016, 12), row(2017, 1), row(2022, 12), row(2023, 1)]);
        let kept = retain_table_years(&table, YearRange::default());
        let keys: Vec<String> = kept.rows().iter().map(|r| r.bucket.to_string()).collect();
        assert_eq!(keys, vec!["2017-01", "2022-12"]);
    }

    // ── select_year ───────────────────────────────────────────────────────────

    #[test]
    fn test_select_year_matches_on_source_label() {
        let mut shifted = row(2021, 3);
        shifted.labels.daylight.year = 2020;
        let table = JoinedTable::new(vec![row(2020, 1), shifted, row(2021, 4)]);

        let production = select_year(&table, SeriesSource::Production, 2021);
        let daylight = select_year(&table, SeriesSource::Daylight, 2021);

        assert_eq!(production.len(), 2);
        assert_eq!(daylight.len(), 1);
        assert_eq!(daylight.rows[0].bucket.month(), 4);
    }

    #[test]
    fn test_select_absent_year_is_empty() {
        let table = JoinedTable::new(vec![row(2020, 1)]);
        let view = select_year(&table, SeriesSource::Temperature, 1999);
        assert!(view.is_empty());
        assert_eq!(view.year, 1999);
        assert_eq!(view.source, SeriesSource::Temperature);
    }
}
