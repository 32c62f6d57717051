//! Monthly resampling of raw records.
//!
//! Groups timestamped values by calendar month and reduces each month with a
//! sum or an arithmetic mean. Months without a single contributing value are
//! absent from the output rather than zero-filled.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use dashboard_core::models::{
    AggregatedSeries, Aggregation, MonthlyBucket, ProductionRecord, SeriesPoint, SeriesSource,
    WeatherRecord,
};
use tracing::debug;

// ── BucketAccumulator ─────────────────────────────────────────────────────────

/// Running total for one month.
///
/// `weighted_sum` is the plain sum for raw values; when re-bucketing an
/// existing mean series each point contributes `value * count` so that the
/// mean of the merged bucket stays exact.
#[derive(Debug, Clone, Default)]
struct BucketAccumulator {
    weighted_sum: f64,
    count: usize,
}

impl BucketAccumulator {
    fn add(&mut self, value: f64, weight: usize) {
        self.weighted_sum += value;
        self.count += weight;
    }

    fn finish(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Sum => self.weighted_sum,
            Aggregation::Mean => self.weighted_sum / self.count as f64,
        }
    }
}

// ── MonthlyResampler ──────────────────────────────────────────────────────────

/// Stateless helper that buckets records by calendar month.
pub struct MonthlyResampler;

impl MonthlyResampler {
    /// Monthly total energy, `sum(kWh)`.
    pub fn production_kwh(records: &[ProductionRecord]) -> AggregatedSeries {
        Self::resample(
            records,
            SeriesSource::Production,
            Aggregation::Sum,
            |r| r.timestamp,
            |r| Some(r.energy_kwh),
        )
    }

    /// Monthly mean of the daily average temperature.
    pub fn mean_temperature(records: &[WeatherRecord]) -> AggregatedSeries {
        Self::resample(
            records,
            SeriesSource::Temperature,
            Aggregation::Mean,
            |r| r.timestamp,
            |r| r.avg_temperature,
        )
    }

    /// Monthly mean of the daily daylight hours.
    pub fn mean_daylight(records: &[WeatherRecord]) -> AggregatedSeries {
        Self::resample(
            records,
            SeriesSource::Daylight,
            Aggregation::Mean,
            |r| r.timestamp,
            |r| r.daylight_hours,
        )
    }

    /// Generic driver: bucket `records` by the month of `timestamp_fn` and
    /// reduce each bucket's `value_fn` values with `aggregation`.
    ///
    /// Records whose value is `None` are ignored. Input order does not
    /// matter; the result is ascending by month.
    pub fn resample<T>(
        records: &[T],
        source: SeriesSource,
        aggregation: Aggregation,
        timestamp_fn: impl Fn(&T) -> NaiveDateTime,
        value_fn: impl Fn(&T) -> Option<f64>,
    ) -> AggregatedSeries {
        let mut buckets: BTreeMap<MonthlyBucket, BucketAccumulator> = BTreeMap::new();

        for record in records {
            if let Some(value) = value_fn(record) {
                buckets
                    .entry(MonthlyBucket::from_timestamp(timestamp_fn(record)))
                    .or_default()
                    .add(value, 1);
            }
        }

        let series = Self::collect(buckets, source, aggregation);
        debug!(
            %source,
            records = records.len(),
            months = series.len(),
            "resampled to monthly series"
        );
        series
    }

    /// Re-bucket an existing series by month, keeping its aggregation.
    ///
    /// A monthly series comes back unchanged.
    pub fn resample_series(series: &AggregatedSeries) -> AggregatedSeries {
        let aggregation = series.aggregation();
        let mut buckets: BTreeMap<MonthlyBucket, BucketAccumulator> = BTreeMap::new();

        for point in series.points() {
            let contribution = match aggregation {
                Aggregation::Sum => point.value,
                Aggregation::Mean => point.value * point.count as f64,
            };
            buckets
                .entry(MonthlyBucket::containing(point.bucket.start()))
                .or_default()
                .add(contribution, point.count);
        }

        Self::collect(buckets, series.source(), aggregation)
    }

    fn collect(
        buckets: BTreeMap<MonthlyBucket, BucketAccumulator>,
        source: SeriesSource,
        aggregation: Aggregation,
    ) -> AggregatedSeries {
        let points = buckets
            .into_iter()
            .map(|(bucket, acc)| SeriesPoint {
                bucket,
                value: acc.finish(aggregation),
                count: acc.count,
            })
            .collect();
        AggregatedSeries::new(source, aggregation, points)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn production(y: i32, m: u32, d: u32, kwh: f64) -> ProductionRecord {
        ProductionRecord {
            timestamp: ts(y, m, d),
            energy_kwh: kwh,
        }
    }

    fn weather(y: i32, m: u32, d: u32, temp: Option<f64>, daylight: Option<f64>) -> WeatherRecord {
        WeatherRecord {
            timestamp: ts(y, m, d),
            avg_temperature: temp,
            daylight_hours: daylight,
        }
    }

    // ── sum ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_sum_over_two_months_has_no_double_counting() {
        let records = vec![
            production(2022, 1, 3, 1.5),
            production(2022, 2, 14, 4.0),
            production(2022, 1, 17, 2.5),
            production(2022, 1, 31, 3.0),
            production(2022, 2, 1, 6.0),
        ];
        let series = MonthlyResampler::production_kwh(&records);

        assert_eq!(series.len(), 2);
        let jan = &series.points()[0];
        let feb = &series.points()[1];
        assert_eq!(jan.bucket.month(), 1);
        assert!((jan.value - 7.0).abs() < 1e-9);
        assert_eq!(jan.count, 3);
        assert_eq!(feb.bucket.month(), 2);
        assert!((feb.value - 10.0).abs() < 1e-9);
        assert_eq!(feb.count, 2);

        let total: f64 = records.iter().map(|r| r.energy_kwh).sum();
        let bucketed: f64 = series.points().iter().map(|p| p.value).sum();
        assert!((total - bucketed).abs() < 1e-9);
    }

    #[test]
    fn test_output_sorted_for_unordered_input() {
        let records = vec![
            production(2021, 12, 1, 1.0),
            production(2020, 6, 1, 1.0),
            production(2021, 1, 1, 1.0),
        ];
        let series = MonthlyResampler::production_kwh(&records);
        let keys: Vec<String> = series.points().iter().map(|p| p.bucket.to_string()).collect();
        assert_eq!(keys, vec!["2020-06", "2021-01", "2021-12"]);
    }

    #[test]
    fn test_months_without_records_are_not_zero_filled() {
        let records = vec![production(2022, 1, 1, 1.0), production(2022, 4, 1, 1.0)];
        let series = MonthlyResampler::production_kwh(&records);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let series = MonthlyResampler::production_kwh(&[]);
        assert!(series.is_empty());
        assert_eq!(series.source(), SeriesSource::Production);
        assert_eq!(series.aggregation(), Aggregation::Sum);
    }

    // ── mean ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_mean_temperature_skips_missing_values() {
        let records = vec![
            weather(2022, 1, 1, Some(-10.0), Some(8.0)),
            weather(2022, 1, 2, None, Some(8.2)),
            weather(2022, 1, 3, Some(-4.0), Some(8.4)),
        ];
        let temps = MonthlyResampler::mean_temperature(&records);
        let daylight = MonthlyResampler::mean_daylight(&records);

        assert!((temps.points()[0].value - -7.0).abs() < 1e-9);
        assert_eq!(temps.points()[0].count, 2);
        assert!((daylight.points()[0].value - 8.2).abs() < 1e-9);
        assert_eq!(daylight.points()[0].count, 3);
    }

    #[test]
    fn test_mean_month_with_only_blanks_is_absent() {
        let records = vec![
            weather(2022, 1, 1, None, Some(8.0)),
            weather(2022, 2, 1, Some(1.0), Some(9.0)),
        ];
        let temps = MonthlyResampler::mean_temperature(&records);
        assert_eq!(temps.len(), 1);
        assert_eq!(temps.points()[0].bucket.month(), 2);
    }

    // ── idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn test_resampling_monthly_sum_series_is_identity() {
        let records = vec![
            production(2022, 1, 3, 1.5),
            production(2022, 1, 4, 2.5),
            production(2022, 3, 9, 4.0),
        ];
        let once = MonthlyResampler::production_kwh(&records);
        let twice = MonthlyResampler::resample_series(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_resampling_monthly_mean_series_is_identity() {
        let records = vec![
            weather(2021, 7, 1, Some(17.3), Some(16.1)),
            weather(2021, 7, 2, Some(19.9), Some(16.0)),
            weather(2021, 7, 3, Some(21.4), Some(15.9)),
            weather(2021, 8, 1, Some(15.0), Some(14.8)),
        ];
        let once = MonthlyResampler::mean_temperature(&records);
        let twice = MonthlyResampler::resample_series(&once);

        assert_eq!(once.len(), twice.len());
        for (a, b) in once.points().iter().zip(twice.points()) {
            assert_eq!(a.bucket, b.bucket);
            assert_eq!(a.count, b.count);
            assert!((a.value - b.value).abs() < 1e-9);
        }
    }
}
