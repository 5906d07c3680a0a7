//! Feature table writing.

use resampler_core::{OutputRow, Result, TimeFormat, TimeNormalizer};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the resampled table as CSV.
///
/// Columns: `TIME,PRICE,VOLUME,NUM_TRADES,TRAILING_PRICE_0..TRAILING_PRICE_{N-1}`.
/// Absent values are written as empty fields.
pub struct TableWriter {
    time_format: TimeFormat,
    normalizer: TimeNormalizer,
    trailing_count: usize,
}

impl TableWriter {
    /// Create a writer. `normalizer` supplies the time zone for `TimeFormat::Datetime`.
    pub fn new(time_format: TimeFormat, normalizer: TimeNormalizer, trailing_count: usize) -> Self {
        Self {
            time_format,
            normalizer,
            trailing_count,
        }
    }

    /// Column names, in output order.
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = ["TIME", "PRICE", "VOLUME", "NUM_TRADES"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend((0..self.trailing_count).map(|k| format!("TRAILING_PRICE_{}", k)));
        header
    }

    /// Write rows to a file, replacing it.
    pub fn write_path(&self, path: impl AsRef<Path>, rows: &[OutputRow]) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_to(file, rows)
    }

    /// Write rows to any sink.
    pub fn write_to<W: Write>(&self, sink: W, rows: &[OutputRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(self.header())?;

        let mut record = Vec::with_capacity(4 + self.trailing_count);
        for row in rows {
            record.clear();
            record.push(self.format_time(row.time)?);
            record.push(format_optional(row.price));
            record.push(format_float(row.volume));
            record.push(row.num_trades.to_string());
            record.extend(
                (0..self.trailing_count)
                    .map(|k| format_optional(row.trailing_prices.get(k).copied().flatten())),
            );
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn format_time(&self, time: i64) -> Result<String> {
        match self.time_format {
            TimeFormat::Epoch => Ok(time.to_string()),
            TimeFormat::Datetime => self.normalizer.format_local(time),
        }
    }
}

/// Shortest round-trip representation, always with a decimal point.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_default()
}
