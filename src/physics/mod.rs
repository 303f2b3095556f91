//! Optical-storage physics.
//!
//! - feature derivation sent with every prediction request (`derive`)
//! - the deterministic SNR baseline the service builds on, for local preview (`baseline`)
//!
//! Everything here is a small pure function: no I/O, no state, no errors.

pub mod baseline;
pub mod derive;

pub use baseline::*;
pub use derive::*;
