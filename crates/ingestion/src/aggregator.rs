//! Window aggregation from raw trade events.
//!
//! Groups trades by normalized timestamp and reduces each group to its last
//! price, summed volume and trade count.

use resampler_core::{Error, RawEvent, Result, TimeNormalizer, TimestampSecs, WindowBucket};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Buckets indexed by boundary, plus the span the series must cover.
#[derive(Debug, Clone)]
pub struct AggregatedWindows {
    buckets: BTreeMap<TimestampSecs, WindowBucket>,
    first_time: TimestampSecs,
    last_time: TimestampSecs,
    event_count: usize,
    out_of_order: usize,
}

impl AggregatedWindows {
    /// Bucket for an exact boundary, if any trades fell into it.
    #[inline]
    pub fn get(&self, time: TimestampSecs) -> Option<&WindowBucket> {
        self.buckets.get(&time)
    }

    /// Buckets with `first <= time <= last`, ascending. Empty when `last < first`.
    pub fn between(
        &self,
        first: TimestampSecs,
        last: TimestampSecs,
    ) -> impl Iterator<Item = &WindowBucket> {
        let range = if first <= last {
            Some(self.buckets.range(first..=last))
        } else {
            None
        };
        range.into_iter().flatten().map(|(_, bucket)| bucket)
    }

    /// Buckets in ascending time order.
    pub fn buckets(&self) -> impl Iterator<Item = &WindowBucket> {
        self.buckets.values()
    }

    /// Number of distinct buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Normalized timestamp of the first event in input order.
    pub fn first_time(&self) -> TimestampSecs {
        self.first_time
    }

    /// Normalized timestamp of the last event in input order.
    pub fn last_time(&self) -> TimestampSecs {
        self.last_time
    }

    /// Number of events aggregated.
    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Events whose timestamp was earlier than the event before them.
    pub fn out_of_order(&self) -> usize {
        self.out_of_order
    }
}

/// A bucket that's currently being built.
#[derive(Debug, Clone)]
struct BucketInProgress {
    time: TimestampSecs,
    last_price: f64,
    volume: f64,
    num_trades: u32,
}

impl BucketInProgress {
    fn new(time: TimestampSecs, price: f64) -> Self {
        Self {
            time,
            last_price: price,
            volume: 0.0,
            num_trades: 0,
        }
    }

    fn add_trade(&mut self, price: f64, volume: f64) {
        self.last_price = price;
        self.volume += volume;
        self.num_trades += 1;
    }

    fn to_bucket(&self) -> WindowBucket {
        WindowBucket {
            time: self.time,
            price: self.last_price,
            volume: self.volume,
            num_trades: self.num_trades,
        }
    }
}

/// Reduces raw events into one bucket per window boundary.
pub struct WindowAggregator {
    normalizer: TimeNormalizer,
}

impl WindowAggregator {
    /// Create a new aggregator.
    pub fn new(normalizer: TimeNormalizer) -> Self {
        Self { normalizer }
    }

    /// Aggregate all events. Events are expected in time order; this is not
    /// enforced, only counted.
    pub fn aggregate(&self, events: &[RawEvent]) -> Result<AggregatedWindows> {
        let (first, last) = match (events.first(), events.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::EmptyInput),
        };

        let mut in_progress: BTreeMap<TimestampSecs, BucketInProgress> = BTreeMap::new();
        let mut out_of_order = 0;
        let mut prev_ts = first.timestamp;

        for event in events {
            if event.timestamp < prev_ts {
                out_of_order += 1;
            }
            prev_ts = event.timestamp;

            let time = self.normalizer.normalize(event.timestamp)?;
            in_progress
                .entry(time)
                .or_insert_with(|| BucketInProgress::new(time, event.price))
                .add_trade(event.price, event.volume);
        }

        if out_of_order > 0 {
            warn!(out_of_order, "trade log is not sorted by TIME; series span follows input order");
        }

        let buckets: BTreeMap<TimestampSecs, WindowBucket> = in_progress
            .into_iter()
            .map(|(time, bucket)| (time, bucket.to_bucket()))
            .collect();

        let windows = AggregatedWindows {
            first_time: self.normalizer.normalize(first.timestamp)?,
            last_time: self.normalizer.normalize(last.timestamp)?,
            event_count: events.len(),
            out_of_order,
            buckets,
        };

        debug!(
            events = windows.event_count,
            buckets = windows.len(),
            first = windows.first_time,
            last = windows.last_time,
            "aggregated trade windows"
        );

        Ok(windows)
    }
}
