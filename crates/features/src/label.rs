//! Label shift for next-step prediction.
//!
//! Each row's price becomes the next row's closing price; the last row has none.
//! Consuming `DenseRow`s keeps trailing features on pre-shift prices.

use resampler_core::{DenseRow, OutputRow};

/// Shift prices one row back so every row is labelled with its successor's close.
pub fn shift_labels(rows: Vec<DenseRow>) -> Vec<OutputRow> {
    let next_prices: Vec<Option<f64>> = rows
        .iter()
        .skip(1)
        .map(|row| Some(row.price))
        .chain(std::iter::once(None))
        .collect();

    rows.into_iter()
        .zip(next_prices)
        .map(|(row, price)| OutputRow {
            time: row.time,
            price,
            volume: row.volume,
            num_trades: row.num_trades,
            trailing_prices: row.trailing_prices,
        })
        .collect()
}
