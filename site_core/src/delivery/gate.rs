//! Inflight admission gate for outbound delivery
//!
//! A crude valve, not a queue: when the ceiling is reached new
//! submissions are rejected outright and the user must resubmit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct InflightGate {
    inflight: Arc<AtomicUsize>,
    ceiling: usize,
}

/// Holds one admitted slot. Dropping the permit releases the slot, so
/// the count is decremented on every exit path including panics.
pub struct InflightPermit {
    inflight: Arc<AtomicUsize>,
}

impl InflightGate {
    pub fn new(ceiling: usize) -> Self {
        Self {
            inflight: Arc::new(AtomicUsize::new(0)),
            ceiling,
        }
    }

    pub fn try_acquire(&self) -> Option<InflightPermit> {
        let result = self
            .inflight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current >= self.ceiling {
                    None
                } else {
                    Some(current + 1)
                }
            });

        match result {
            Ok(_) => Some(InflightPermit {
                inflight: Arc::clone(&self.inflight),
            }),
            Err(_) => None,
        }
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::Acquire)
    }
}

impl Drop for InflightPermit {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::AcqRel);
    }
}
