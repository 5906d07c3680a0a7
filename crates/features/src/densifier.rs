//! Time series densification.
//!
//! Walks every window boundary between the first and last event and emits one
//! row per boundary. Boundaries without trades carry the previous price
//! forward with zero volume and trade count.

use crate::trailing::TrailingFeatureGenerator;
use resampler_core::{DenseRow, Error, Result, TimestampSecs};
use resampler_ingestion::AggregatedWindows;
use tracing::debug;

/// Builds the dense, regular series from aggregated buckets.
pub struct Densifier {
    increment: i64,
    trailing: TrailingFeatureGenerator,
}

impl Densifier {
    /// Create a densifier stepping by `increment` seconds (must be positive).
    pub fn new(increment: i64, trailing: TrailingFeatureGenerator) -> Self {
        Self {
            increment,
            trailing,
        }
    }

    /// Number of boundaries in `[first, last]`. Zero when `last < first`.
    pub fn expected_rows(&self, first: TimestampSecs, last: TimestampSecs) -> usize {
        if last < first {
            0
        } else {
            ((last - first) / self.increment) as usize + 1
        }
    }

    /// Trailing feature generator attached to every row.
    pub fn trailing(&self) -> &TrailingFeatureGenerator {
        &self.trailing
    }

    /// Densify over the span reported by the aggregator.
    pub fn densify(&self, windows: &AggregatedWindows) -> Result<Vec<DenseRow>> {
        self.densify_range(windows, windows.first_time(), windows.last_time())
    }

    /// Densify over an explicit span `[first, last]`.
    pub fn densify_range(
        &self,
        windows: &AggregatedWindows,
        first: TimestampSecs,
        last: TimestampSecs,
    ) -> Result<Vec<DenseRow>> {
        if let Some(stray) = windows
            .between(first, last)
            .find(|bucket| (bucket.time - first).rem_euclid(self.increment) != 0)
        {
            return Err(Error::data(format!(
                "bucket {} is off the {} s grid starting at {}",
                stray.time, self.increment, first
            )));
        }

        let mut rows: Vec<DenseRow> = Vec::with_capacity(self.expected_rows(first, last));
        let mut filled = 0usize;
        let mut now = first;

        while now <= last {
            let (price, volume, num_trades) = match windows.get(now) {
                Some(bucket) => (bucket.price, bucket.volume, bucket.num_trades),
                None => {
                    let previous = rows.last().ok_or(Error::FirstBucketMissing(now))?;
                    filled += 1;
                    (previous.price, 0.0, 0)
                }
            };

            let trailing_prices = self.trailing.features_for(&rows);
            rows.push(DenseRow {
                time: now,
                price,
                volume,
                num_trades,
                trailing_prices,
            });

            now += self.increment;
        }

        debug!(rows = rows.len(), filled, "densified series");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono_tz::Tz;
    use resampler_core::{RawEvent, TimeNormalizer};
    use resampler_ingestion::WindowAggregator;

    fn windows(window_secs: i64, events: &[RawEvent]) -> AggregatedWindows {
        WindowAggregator::new(TimeNormalizer::new(window_secs, Tz::UTC))
            .aggregate(events)
            .unwrap()
    }

    fn densifier(increment: i64, offsets: Vec<usize>) -> Densifier {
        Densifier::new(increment, TrailingFeatureGenerator::with_offsets(offsets))
    }

    #[test]
    fn test_carry_forward_gap() {
        let w = windows(600, &[RawEvent::new(0, 10.0, 1.0), RawEvent::new(1800, 11.0, 2.0)]);
        let rows = densifier(600, vec![1]).densify(&w).unwrap();

        let times: Vec<_> = rows.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![0, 600, 1200, 1800]);

        for gap in &rows[1..3] {
            assert!(gap.is_gap());
            assert_relative_eq!(gap.volume, 0.0);
            assert_eq!(gap.num_trades, 0);
            assert_relative_eq!(gap.price, 10.0);
        }
        assert_relative_eq!(rows[3].price, 11.0);
        assert_eq!(rows[3].num_trades, 1);
    }

    #[test]
    fn test_row_count_matches_span() {
        let events = [
            RawEvent::new(1_514_764_800, 1.0, 1.0),
            RawEvent::new(1_514_768_000, 2.0, 1.0),
            RawEvent::new(1_514_800_123, 3.0, 1.0),
        ];
        let w = windows(600, &events);
        let d = densifier(600, vec![1, 2]);
        let rows = d.densify(&w).unwrap();

        let expected = ((w.last_time() - w.first_time()) / 600) as usize + 1;
        assert_eq!(rows.len(), expected);
        assert_eq!(d.expected_rows(w.first_time(), w.last_time()), expected);
        assert!(rows.windows(2).all(|p| p[1].time - p[0].time == 600));
    }

    #[test]
    fn test_trailing_uses_prior_rows() {
        let events: Vec<RawEvent> = (0..6).map(|i| RawEvent::new(i * 600, 100.0 + i as f64, 1.0)).collect();
        let w = windows(600, &events);
        let rows = densifier(600, vec![1, 2, 4]).densify(&w).unwrap();

        assert_eq!(rows[0].trailing_prices, vec![None, None, None]);
        assert_eq!(rows[1].trailing_prices, vec![Some(100.0), None, None]);
        assert_eq!(rows[3].trailing_prices, vec![Some(102.0), Some(101.0), None]);
        assert_eq!(rows[5].trailing_prices, vec![Some(104.0), Some(103.0), Some(101.0)]);
    }

    #[test]
    fn test_trailing_sees_carried_prices() {
        let w = windows(600, &[RawEvent::new(0, 10.0, 1.0), RawEvent::new(1800, 11.0, 2.0)]);
        let rows = densifier(600, vec![1]).densify(&w).unwrap();
        assert_eq!(rows[3].trailing_prices, vec![Some(10.0)]);
    }

    #[test]
    fn test_first_bucket_missing() {
        let w = windows(600, &[RawEvent::new(1200, 10.0, 1.0)]);
        let err = densifier(600, vec![1]).densify_range(&w, 600, 1200).unwrap_err();
        assert!(matches!(err, Error::FirstBucketMissing(600)));
    }

    #[test]
    fn test_reversed_span_is_empty() {
        let w = windows(600, &[RawEvent::new(1800, 10.0, 1.0), RawEvent::new(0, 9.0, 1.0)]);
        let rows = densifier(600, vec![1]).densify(&w).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_berlin_dst_forward_keeps_every_bucket() {
        // 2024-03-30 21:00 UTC (CET) and 2024-03-31 10:00 UTC (CEST), hourly windows.
        let normalizer = TimeNormalizer::new(3600, chrono_tz::Europe::Berlin);
        let events = [
            RawEvent::new(1_711_832_400, 10.0, 1.0),
            RawEvent::new(1_711_879_200, 99.0, 5.0),
        ];
        let w = WindowAggregator::new(normalizer).aggregate(&events).unwrap();
        let rows = densifier(3600, vec![1]).densify(&w).unwrap();

        assert_eq!(rows.len(), 14);
        assert!(rows.windows(2).all(|p| p[1].time - p[0].time == 3600));
        let last = rows.last().unwrap();
        assert_eq!(last.time, 1_711_879_200);
        assert_relative_eq!(last.volume, 5.0);
        assert_eq!(rows.iter().map(|r| r.num_trades).sum::<u32>(), 2);
    }

    #[test]
    fn test_bucket_off_grid_is_an_error() {
        // A 2 h window rounded in Berlin drifts by 1 h across the spring transition.
        let normalizer = TimeNormalizer::new(7200, chrono_tz::Europe::Berlin);
        let events = [
            RawEvent::new(1_711_832_400, 10.0, 1.0),
            RawEvent::new(1_711_879_200, 99.0, 5.0),
        ];
        let w = WindowAggregator::new(normalizer).aggregate(&events).unwrap();
        let err = densifier(7200, vec![1]).densify(&w).unwrap_err();
        assert!(matches!(err, Error::Data(_)));
    }

    #[test]
    fn test_single_bucket() {
        let w = windows(600, &[RawEvent::new(10, 5.0, 1.0)]);
        let rows = densifier(600, vec![1]).densify(&w).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].time, 0);
        assert_eq!(rows[0].trailing_prices, vec![None]);
    }
}
