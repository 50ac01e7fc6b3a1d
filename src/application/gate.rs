//! Sequence gate: the single-holder lock that keeps one martingale sequence
//! in flight per process.
//!
//! The holder is tracked as a generation number so that a guard left over
//! from a cancelled sequence can never release the gate for its successor.
//! Acquisition is a single compare-and-swap and never waits. Every release
//! path resets the sequence state under the state lock before freeing the
//! holder slot, so a new holder always starts from idle defaults.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::{MartingalePlan, TradeSequenceState};

const FREE: u64 = 0;

/// Process-wide sequence gate owning the [`TradeSequenceState`].
pub struct SequenceGate {
    holder: AtomicU64,
    next_generation: AtomicU64,
    state: Mutex<TradeSequenceState>,
}

impl SequenceGate {
    #[must_use]
    pub fn new(plan: MartingalePlan) -> Self {
        Self {
            holder: AtomicU64::new(FREE),
            next_generation: AtomicU64::new(1),
            state: Mutex::new(TradeSequenceState::new(plan)),
        }
    }

    /// Try to take the gate. Returns `false` immediately if it is held.
    pub fn try_acquire(&self) -> bool {
        self.acquire_generation().is_some()
    }

    /// Take the gate and return a guard that releases it on drop.
    #[must_use]
    pub fn enter(self: &Arc<Self>) -> Option<SequenceGuard> {
        let generation = self.acquire_generation()?;
        debug!(generation, "Sequence gate acquired");
        Some(SequenceGuard {
            gate: Arc::clone(self),
            generation,
            released: false,
        })
    }

    /// Release the gate and reset the state. Idempotent: returns `false` if
    /// the gate was already free.
    pub fn release(&self) -> bool {
        let mut state = self.state.lock();
        if self.holder.load(Ordering::Acquire) == FREE {
            return false;
        }
        state.reset();
        self.holder.store(FREE, Ordering::Release);
        debug!("Sequence gate released");
        true
    }

    /// Whether a sequence currently holds the gate.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.holder.load(Ordering::Acquire) != FREE
    }

    /// Copy of the current sequence state.
    #[must_use]
    pub fn snapshot(&self) -> TradeSequenceState {
        self.state.lock().clone()
    }

    fn acquire_generation(&self) -> Option<u64> {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.holder
            .compare_exchange(FREE, generation, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| generation)
    }

    fn release_generation(&self, generation: u64) -> bool {
        let mut state = self.state.lock();
        // Only release paths clear a non-free holder, and they all hold the
        // state lock, so the holder cannot change under us here.
        if self.holder.load(Ordering::Acquire) != generation {
            return false;
        }
        state.reset();
        self.holder.store(FREE, Ordering::Release);
        debug!(generation, "Sequence gate released");
        true
    }
}

/// Exclusive right to mutate the sequence state.
///
/// Dropping the guard releases the gate exactly once, which covers error
/// returns, panics and task aborts alike.
pub struct SequenceGuard {
    gate: Arc<SequenceGate>,
    generation: u64,
    released: bool,
}

impl SequenceGuard {
    /// Run `f` against the state. Returns `None` if this guard no longer
    /// holds the gate.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut TradeSequenceState) -> R) -> Option<R> {
        let mut state = self.gate.state.lock();
        if self.released || self.gate.holder.load(Ordering::Acquire) != self.generation {
            return None;
        }
        Some(f(&mut state))
    }

    /// Copy of the state, if still held.
    #[must_use]
    pub fn snapshot(&self) -> Option<TradeSequenceState> {
        self.with_state(|s| s.clone())
    }

    /// Release now rather than at drop.
    pub fn release(mut self) -> bool {
        self.release_once()
    }

    fn release_once(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.gate.release_generation(self.generation)
    }
}

impl Drop for SequenceGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}
