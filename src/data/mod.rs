//! Data sources other than the remote predictor.
//!
//! - synthetic OSIS samples for offline checks and evaluation runs (`dataset`)

pub mod dataset;

pub use dataset::*;
