//! Trade log reading.
//!
//! Reads a headered CSV table with at least `TIME`, `PRICE` and `VOLUME`
//! columns. Any other columns are ignored.

use chrono::DateTime;
use resampler_core::{Error, RawEvent, Result, TimestampSecs};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Epoch-seconds trade time column.
pub const TIME_COLUMN: &str = "TIME";
/// Trade price column.
pub const PRICE_COLUMN: &str = "PRICE";
/// Trade volume column.
pub const VOLUME_COLUMN: &str = "VOLUME";

/// Reader for tick-level trade logs.
pub struct EventReader;

/// Positions of the required columns in the header.
struct ColumnIndex {
    time: usize,
    price: usize,
    volume: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        match (find(TIME_COLUMN), find(PRICE_COLUMN), find(VOLUME_COLUMN)) {
            (Some(time), Some(price), Some(volume)) => Ok(Self { time, price, volume }),
            (time, price, volume) => {
                let missing: Vec<&str> = [
                    (TIME_COLUMN, time),
                    (PRICE_COLUMN, price),
                    (VOLUME_COLUMN, volume),
                ]
                .iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| *name)
                .collect();
                Err(Error::schema(format!(
                    "missing required column(s): {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl EventReader {
    /// Read all trade events from a CSV file.
    pub fn read_path(path: impl AsRef<Path>) -> Result<Vec<RawEvent>> {
        let file = File::open(path.as_ref())?;
        Self::read_from(file)
    }

    /// Read all trade events from any CSV source.
    ///
    /// Fails with `EmptyInput` when the source has no header or no data rows.
    pub fn read_from<R: Read>(source: R) -> Result<Vec<RawEvent>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(Error::EmptyInput);
        }
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut events = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let row = idx as u64 + 1;
            let record = record.map_err(|e| Error::parse(row, e.to_string()))?;
            events.push(parse_event(&record, &columns, row)?);
        }

        if events.is_empty() {
            return Err(Error::EmptyInput);
        }

        debug!(events = events.len(), "read trade log");
        Ok(events)
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize, name: &str, row: u64) -> Result<&'r str> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::parse(row, format!("{} is empty", name))),
    }
}

fn parse_event(record: &csv::StringRecord, columns: &ColumnIndex, row: u64) -> Result<RawEvent> {
    let timestamp = parse_timestamp(field(record, columns.time, TIME_COLUMN, row)?, row)?;
    let price = parse_finite(field(record, columns.price, PRICE_COLUMN, row)?, PRICE_COLUMN, row)?;
    let volume = parse_finite(field(record, columns.volume, VOLUME_COLUMN, row)?, VOLUME_COLUMN, row)?;
    Ok(RawEvent::new(timestamp, price, volume))
}

/// Parse epoch seconds. Fractional values are truncated toward zero.
fn parse_timestamp(raw: &str, row: u64) -> Result<TimestampSecs> {
    let ts = match raw.parse::<i64>() {
        Ok(ts) => ts,
        Err(_) => {
            let value: f64 = raw
                .parse()
                .map_err(|_| Error::parse(row, format!("TIME '{}' is not a number", raw)))?;
            if !value.is_finite() || value.abs() >= i64::MAX as f64 {
                return Err(Error::parse(row, format!("TIME '{}' is out of range", raw)));
            }
            value.trunc() as i64
        }
    };

    if DateTime::from_timestamp(ts, 0).is_none() {
        return Err(Error::parse(row, format!("TIME '{}' is out of range", raw)));
    }
    Ok(ts)
}

fn parse_finite(raw: &str, name: &str, row: u64) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(Error::parse(row, format!("{} '{}' is not finite", name, raw))),
        Err(_) => Err(Error::parse(row, format!("{} '{}' is not a number", name, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn read(csv: &str) -> Result<Vec<RawEvent>> {
        EventReader::read_from(csv.as_bytes())
    }

    #[test]
    fn test_read_basic() {
        let events = read("TIME,PRICE,VOLUME\n1000,100.5,1\n1600,101,0.25\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, 1000);
        assert_relative_eq!(events[0].price, 100.5);
        assert_relative_eq!(events[1].volume, 0.25);
    }

    #[test]
    fn test_extra_columns_and_order_ignored() {
        let events = read(",VOLUME,SIDE,PRICE,TIME\n0,2.0,buy,10.0,1514764800\n").unwrap();
        assert_eq!(events, vec![RawEvent::new(1_514_764_800, 10.0, 2.0)]);
    }

    #[test]
    fn test_fractional_time_truncated() {
        let events = read("TIME,PRICE,VOLUME\n1514764800.9,1,1\n").unwrap();
        assert_eq!(events[0].timestamp, 1_514_764_800);
    }

    #[test]
    fn test_missing_columns() {
        let err = read("TIME,AMOUNT\n1,2\n").unwrap_err();
        match err {
            Error::Schema(msg) => {
                assert!(msg.contains("PRICE"));
                assert!(msg.contains("VOLUME"));
                assert!(!msg.contains("TIME"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(read(""), Err(Error::EmptyInput)));
        assert!(matches!(read("TIME,PRICE,VOLUME\n"), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_unparsable_field_reports_row() {
        let err = read("TIME,PRICE,VOLUME\n1000,1,1\n1600,abc,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { row: 2, .. }));

        let err = read("TIME,PRICE,VOLUME\n,1,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { row: 1, .. }));

        let err = read("TIME,PRICE,VOLUME\n1000,inf,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { row: 1, .. }));
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = read("TIME,PRICE,VOLUME\n1000,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { row: 1, .. }));
    }

    #[test]
    fn test_unrepresentable_time() {
        let err = read("TIME,PRICE,VOLUME\n9223372036854775807,1,1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { row: 1, .. }));
    }

    #[test]
    fn test_read_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TIME,PRICE,VOLUME").unwrap();
        writeln!(file, "1000,100,1").unwrap();
        let events = EventReader::read_path(file.path()).unwrap();
        assert_eq!(events.len(), 1);

        let missing = file.path().with_extension("missing");
        assert!(matches!(EventReader::read_path(missing), Err(Error::Io(_))));
    }
}
