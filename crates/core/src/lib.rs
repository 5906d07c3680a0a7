//! Core types and configuration for the tick resampler.
//!
//! This crate provides shared types used across all other crates:
//! - Trade events, window buckets and output rows
//! - Configuration structures
//! - Day-relative timestamp normalization
//! - Common error types

pub mod config;
pub mod error;
pub mod time;
pub mod types;

pub use config::{Config, OutputConfig, TimeFormat, TrailingConfig, WindowConfig};
pub use error::{Error, Result};
pub use time::TimeNormalizer;
pub use types::*;
