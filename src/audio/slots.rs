//! Bounded note-slot pool
//!
//! A slot is held for the whole life of an accepted note, from dispatch
//! until its note-off. Acquisition never blocks: a full pool is reported
//! to the caller, which drops the note.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counter of in-flight note executions
#[derive(Debug)]
pub struct NoteSlots {
    in_flight: AtomicUsize,
    max: usize,
}

impl NoteSlots {
    pub fn new(max: usize) -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max,
        })
    }

    /// Claim a slot, or `None` when all are taken
    pub fn try_acquire(self: &Arc<Self>) -> Option<SlotGuard> {
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current >= self.max {
                return None;
            }
            match self.in_flight.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(SlotGuard {
                        slots: Arc::clone(self),
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

/// Releases its slot when dropped
#[derive(Debug)]
pub struct SlotGuard {
    slots: Arc<NoteSlots>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.slots.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Clears the melody in-flight flag when dropped
#[derive(Debug)]
pub struct FlightGuard {
    flag: Arc<AtomicBool>,
}

impl FlightGuard {
    /// Raise the flag and hand back its guard
    pub fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::Release);
        Self {
            flag: Arc::clone(flag),
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
