//! Sweep generations.
//!
//! In-flight requests are never cancelled. Instead every sweep takes a ticket
//! when it starts, and whoever consumes the result drops it unless its ticket
//! is still the latest one. A quick resubmit therefore can't have an older,
//! slower sweep overwrite the newer chart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct SweepGeneration {
    latest: Arc<AtomicU64>,
}

impl SweepGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation; every earlier ticket becomes stale.
    pub fn begin(&self) -> SweepTicket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        SweepTicket {
            id,
            latest: Arc::clone(&self.latest),
        }
    }

    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SweepTicket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl SweepTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_ticket_supersedes_older() {
        let generation = SweepGeneration::new();
        let first = generation.begin();
        assert!(first.is_current());

        let second = generation.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert_eq!(second.id(), first.id() + 1);
        assert_eq!(generation.current(), second.id());
    }

    #[test]
    fn clones_share_the_counter() {
        let generation = SweepGeneration::new();
        let ticket = generation.begin();
        generation.clone().begin();
        assert!(!ticket.is_current());
    }
}
