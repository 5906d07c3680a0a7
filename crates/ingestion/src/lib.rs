//! Data ingestion and serialization for the tick resampler.
//!
//! This crate handles:
//! - Trade log reading (CSV)
//! - Window aggregation (last price, summed volume, trade count)
//! - Feature table writing (CSV)

pub mod aggregator;
pub mod reader;
pub mod writer;

pub use aggregator::{AggregatedWindows, WindowAggregator};
pub use reader::EventReader;
pub use writer::TableWriter;
