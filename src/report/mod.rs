//! Reporting utilities: formatted terminal output and evaluation metrics.
//!
//! We keep formatting code in one place so:
//! - the physics/client/sweep code stays free of presentation concerns
//! - output changes are localized

pub mod format;
pub mod metrics;

pub use format::*;
pub use metrics::*;
