//! Latest-result gate for overlapping recomputations.
//!
//! Every trigger (range change, comparison toggle, drill-down click, record
//! refresh) takes a ticket before computing. When results come back, only
//! the newest ticket's result is accepted; anything older is dropped so
//! out-of-order completions never overwrite fresher state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Identifies one recomputation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

pub struct RecomputeGate<T> {
    issued:  AtomicU64,
    applied: Mutex<Option<(Ticket, T)>>,
}

impl<T: Clone> RecomputeGate<T> {
    pub fn new() -> Self {
        Self {
            issued:  AtomicU64::new(0),
            applied: Mutex::new(None),
        }
    }

    /// Issue a ticket for a new recomputation. Supersedes all earlier tickets.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Offer a finished result. Returns `true` if it was applied.
    pub fn complete(&self, ticket: Ticket, result: T) -> bool {
        if !self.is_current(ticket) {
            log::warn!(
                "discarding stale recompute result (generation {}, latest {})",
                ticket.0,
                self.issued.load(Ordering::SeqCst),
            );
            return false;
        }
        let mut slot = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A newer ticket may have been issued and applied while we waited.
        if slot.as_ref().is_some_and(|(applied, _)| *applied > ticket) {
            return false;
        }
        *slot = Some((ticket, result));
        true
    }

    /// The most recently applied result.
    pub fn latest(&self) -> Option<T> {
        let slot = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        slot.as_ref().map(|(_, result)| result.clone())
    }
}

impl<T: Clone> Default for RecomputeGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
