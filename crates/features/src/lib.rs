//! Feature construction for the tick resampler.
//!
//! This crate handles:
//! - Densification of aggregated windows (carry-forward gap filling)
//! - Log-spaced trailing price features
//! - Label shift for next-step prediction
//! - The batch resampling engine tying the stages together

pub mod densifier;
pub mod engine;
pub mod label;
pub mod trailing;

pub use densifier::Densifier;
pub use engine::{ResampleEngine, Resampled, RunSummary};
pub use label::shift_labels;
pub use trailing::{log_spaced_offsets, TrailingFeatureGenerator};
