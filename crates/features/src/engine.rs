//! Resampling engine.
//!
//! Combines normalization, aggregation, densification, trailing features and
//! the label shift into one batch transform.

use crate::densifier::Densifier;
use crate::label::shift_labels;
use crate::trailing::TrailingFeatureGenerator;
use resampler_core::{Config, OutputRow, RawEvent, Result, TimeNormalizer};
use resampler_ingestion::WindowAggregator;
use serde::Serialize;
use tracing::info;

/// Counts describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Events read.
    pub events: usize,
    /// Distinct non-empty windows.
    pub buckets: usize,
    /// Rows emitted.
    pub rows: usize,
    /// Rows filled in for windows with no trades.
    pub filled_rows: usize,
    /// Events earlier than the event before them.
    pub out_of_order_events: usize,
}

/// Output of a run.
#[derive(Debug, Clone)]
pub struct Resampled {
    pub rows: Vec<OutputRow>,
    pub summary: RunSummary,
}

/// Batch resampling engine.
pub struct ResampleEngine {
    normalizer: TimeNormalizer,
    aggregator: WindowAggregator,
    densifier: Densifier,
}

impl ResampleEngine {
    /// Create an engine from configuration. Fails with a config error on invalid constants.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let normalizer = TimeNormalizer::from_config(&config.window)?;
        let trailing = TrailingFeatureGenerator::new(&config.trailing);

        Ok(Self {
            normalizer,
            aggregator: WindowAggregator::new(normalizer),
            densifier: Densifier::new(config.window.window_secs, trailing),
        })
    }

    /// Normalizer used for bucket boundaries.
    pub fn normalizer(&self) -> &TimeNormalizer {
        &self.normalizer
    }

    /// Trailing row offsets in feature order.
    pub fn trailing_offsets(&self) -> &[usize] {
        self.densifier.trailing().offsets()
    }

    /// Number of trailing price columns per row.
    pub fn trailing_count(&self) -> usize {
        self.densifier.trailing().count()
    }

    /// Run the full transform.
    pub fn run(&self, events: &[RawEvent]) -> Result<Resampled> {
        let windows = self.aggregator.aggregate(events)?;
        let dense = self.densifier.densify(&windows)?;
        let filled_rows = dense.iter().filter(|row| row.is_gap()).count();
        let rows = shift_labels(dense);

        let summary = RunSummary {
            events: windows.event_count(),
            buckets: windows.len(),
            rows: rows.len(),
            filled_rows,
            out_of_order_events: windows.out_of_order(),
        };

        info!(
            events = summary.events,
            buckets = summary.buckets,
            rows = summary.rows,
            filled_rows = summary.filled_rows,
            "resampled trade log"
        );

        Ok(Resampled { rows, summary })
    }
}
