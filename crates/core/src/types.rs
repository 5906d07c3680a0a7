//! Core data types for the tick resampler.

use serde::{Deserialize, Serialize};

/// Timestamp in seconds since Unix epoch (UTC).
pub type TimestampSecs = i64;

/// A single trade read from the input log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Trade time in epoch seconds.
    pub timestamp: TimestampSecs,
    /// Trade price.
    pub price: f64,
    /// Trade volume.
    pub volume: f64,
}

impl RawEvent {
    pub fn new(timestamp: TimestampSecs, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}

/// Summary of all trades whose normalized timestamp equals one window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowBucket {
    /// Window boundary timestamp.
    pub time: TimestampSecs,
    /// Price of the last trade in input order.
    pub price: f64,
    /// Summed volume.
    pub volume: f64,
    /// Number of trades.
    pub num_trades: u32,
}

/// One densified row before the label shift.
///
/// `price` is the bucket's own closing price (or the carried-forward price for a
/// gap). Trailing prices always refer to these pre-shift prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseRow {
    /// Window boundary timestamp.
    pub time: TimestampSecs,
    /// Closing price of this window.
    pub price: f64,
    /// Volume traded in this window (0 for gaps).
    pub volume: f64,
    /// Trades in this window (0 for gaps).
    pub num_trades: u32,
    /// Prices at the configured trailing offsets; `None` before the series start.
    pub trailing_prices: Vec<Option<f64>>,
}

impl DenseRow {
    /// Whether this row was filled in for a window with no trades.
    #[inline]
    pub fn is_gap(&self) -> bool {
        self.num_trades == 0
    }
}

/// Final output row, after the label shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Window boundary timestamp.
    pub time: TimestampSecs,
    /// Closing price of the *next* window; `None` for the last row.
    pub price: Option<f64>,
    /// Volume traded in this window.
    pub volume: f64,
    /// Trades in this window.
    pub num_trades: u32,
    /// Pre-shift prices at the configured trailing offsets.
    pub trailing_prices: Vec<Option<f64>>,
}
