//! `osis-snr` library crate.
//!
//! Client side of the optical storage SNR predictor: derived-feature physics,
//! the HTTP prediction client, concurrent NA sweeps, and the CLI/TUI front
//! ends. The binary (`osis`) is a thin wrapper around this library so the core
//! logic is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod client;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod physics;
pub mod plot;
pub mod report;
pub mod sweep;
pub mod tui;
