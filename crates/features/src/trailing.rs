//! Trailing price features.
//!
//! Each row carries the prices of rows a fixed number of positions back. The
//! offsets are log-spaced so recent history is sampled densely and distant
//! history sparsely.

use resampler_core::{DenseRow, TrailingConfig};

/// Tolerance added before flooring so exact powers are not lost to rounding.
const FLOOR_EPSILON: f64 = 1e-9;

/// Row offsets `floor((max_offset + 1)^(k / (count - 1)))` for `k in 0..count`,
/// clamped into `[1, max_offset]`.
///
/// The unclamped last term is always `max_offset + 1`; clamping pulls it back to
/// `max_offset`, so the defaults end at 120 rather than 121.
///
/// Duplicates are kept so the feature width is always `count`.
pub fn log_spaced_offsets(count: usize, max_offset: usize) -> Vec<usize> {
    let base = (max_offset + 1) as f64;
    (0..count)
        .map(|k| {
            let exponent = if count > 1 {
                k as f64 / (count - 1) as f64
            } else {
                0.0
            };
            let offset = (base.powf(exponent) + FLOOR_EPSILON).floor() as usize;
            offset.clamp(1, max_offset)
        })
        .collect()
}

/// Looks up trailing prices in the already-emitted prefix of the series.
#[derive(Debug, Clone)]
pub struct TrailingFeatureGenerator {
    offsets: Vec<usize>,
}

impl TrailingFeatureGenerator {
    /// Create a generator from trailing configuration.
    pub fn new(config: &TrailingConfig) -> Self {
        Self::with_offsets(log_spaced_offsets(config.count, config.max_offset))
    }

    /// Create a generator with explicit offsets.
    pub fn with_offsets(offsets: Vec<usize>) -> Self {
        Self { offsets }
    }

    /// Offsets in feature order.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Number of features per row.
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    /// Features for the row about to be appended at position `prefix.len()`.
    pub fn features_for(&self, prefix: &[DenseRow]) -> Vec<Option<f64>> {
        let position = prefix.len();
        self.offsets
            .iter()
            .map(|&offset| trailing_price(prefix, position, offset))
            .collect()
    }
}

/// Price of the row `offset` positions before `position`, if it exists.
#[inline]
pub fn trailing_price(prefix: &[DenseRow], position: usize, offset: usize) -> Option<f64> {
    position
        .checked_sub(offset)
        .and_then(|idx| prefix.get(idx))
        .map(|row| row.price)
}
