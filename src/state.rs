//! Shared per-worker state for the bakery protocol.
//!
//! This module stores the two parallel arrays the algorithm operates on and
//! nothing else: no waiting, no ordering decisions. The access pattern that
//! makes the data meaningful lives in [`crate::lock`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Smallest supported worker count.
pub const MIN_WORKERS: usize = 1;
/// Largest supported worker count.
pub const MAX_WORKERS: usize = 256;

/// The shared state of the bakery: one choosing flag and one ticket per
/// worker, plus the fixed worker count.
///
/// A single instance is created before any worker starts and is read and
/// written by every worker concurrently for the life of the process. Every
/// slot is a sequentially-consistent atomic: the doorway argument requires
/// that `choosing[i] = false` never becomes visible before `ticket[i]` does,
/// and plain shared variables give no such guarantee.
///
/// # Invariants
///
/// - Worker indices are dense in `[0, n)`; each worker owns exactly one index.
/// - `ticket(i) == 0` means worker i is not contending.
/// - By protocol convention, worker i writes only its own slots.
pub struct MutexState {
    choosing: Box<[AtomicBool]>,
    ticket: Box<[AtomicU64]>,
    n: usize,
}

impl MutexState {
    /// Creates state for `n` workers, all flags false and all tickets zero.
    ///
    /// Returns [`Error::InvalidConfiguration`][crate::error::Error] if `n`
    /// is outside `[1, 256]`.
    pub fn new(n: usize) -> crate::error::Result<Self> {
        if !(MIN_WORKERS..=MAX_WORKERS).contains(&n) {
            return Err(crate::error::Error::InvalidConfiguration { n });
        }

        let choosing = (0..n).map(|_| AtomicBool::new(false)).collect();
        let ticket = (0..n).map(|_| AtomicU64::new(0)).collect();

        Ok(Self { choosing, ticket, n })
    }

    /// Number of workers this state was sized for.
    pub fn worker_count(&self) -> usize {
        self.n
    }

    pub fn choosing(&self, i: usize) -> bool {
        self.choosing[i].load(Ordering::SeqCst)
    }
    pub fn set_choosing(&self, i: usize, value: bool) {
        self.choosing[i].store(value, Ordering::SeqCst);
    }

    pub fn ticket(&self, i: usize) -> u64 {
        self.ticket[i].load(Ordering::SeqCst)
    }
    pub fn set_ticket(&self, i: usize, value: u64) {
        self.ticket[i].store(value, Ordering::SeqCst);
    }

    /// The largest ticket currently held by any worker, zeros included.
    ///
    /// The scan is not atomic with any subsequent assignment; two workers
    /// racing through it can observe the same maximum. The lock's tie-break
    /// on worker index accounts for that.
    pub fn max_ticket(&self) -> u64 {
        (0..self.n).map(|j| self.ticket(j)).max().unwrap_or(0)
    }
}

impl std::fmt::Debug for MutexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutexState")
            .field("n", &self.n)
            .field("tickets", &(0..self.n).map(|i| self.ticket(i)).collect::<Vec<_>>())
            .finish()
    }
}
