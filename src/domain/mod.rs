//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - user-facing physical inputs (`PhysicalInputs`, `InputDraft`, `RecordingMaterial`)
//! - the outgoing request (`PredictionRequest`), which always carries freshly derived features
//! - predictor output (`PredictionResponse`) and sweep results (`SweepPoint`, `SweepSeries`)

pub mod types;

pub use types::*;
