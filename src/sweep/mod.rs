//! Parameter sweeps.
//!
//! Responsibilities:
//!
//! - generate the sweep grid without floating-point step drift (`grid`)
//! - fan out one prediction per grid point and join them in grid order (`orchestrator`)
//! - tell superseded sweeps apart from the latest one (`generation`)

pub mod generation;
pub mod grid;
pub mod orchestrator;

pub use generation::*;
pub use grid::*;
pub use orchestrator::*;
