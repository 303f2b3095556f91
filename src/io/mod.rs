//! Input/output helpers.
//!
//! - physical inputs from a JSON file (`inputs`)
//! - CSV exports of datasets and sweeps (`export`)

pub mod export;
pub mod inputs;

pub use export::*;
pub use inputs::*;
