//! The bakery lock: Lamport's algorithm over [`MutexState`].
//!
//! Mutual exclusion for N workers using only atomic loads and stores. A
//! worker entering announces it is choosing, scans everyone's ticket, takes
//! one past the maximum, then waits its turn at the doorway: for each other
//! worker, first until that worker is done choosing, then until that worker
//! is no longer ahead in (ticket, index) order. Ties on ticket value are
//! possible because the scan is not atomic with the assignment; the index
//! tie-break keeps the order total.
//!
//! `acquire` busy-waits. There is no queue, no OS primitive, no timeout: a
//! holder that never releases starves every worker behind it.

use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::state::MutexState;

/// True iff contending worker j is ahead of worker i in the admission order.
///
/// The order is lexicographic on (ticket, index) and strict: for distinct
/// contending workers exactly one of them is ahead of the other. A zero
/// `ticket_j` means j is not contending and never blocks anyone.
fn is_ahead(ticket_j: u64, j: usize, ticket_i: u64, i: usize) -> bool {
    ticket_j != 0 && (ticket_j < ticket_i || (ticket_j == ticket_i && j < i))
}

/// The lock itself. One instance is shared (via [`Arc`]) by every worker.
///
/// Each worker is identified by a stable index in `[0, n)` and must be the
/// only caller using that index. Calling [`acquire`][Self::acquire] twice
/// for the same index without an intervening [`release`][Self::release] is
/// a contract violation and panics.
pub struct BakeryLock {
    state: Arc<MutexState>,
}

impl BakeryLock {
    /// Creates a lock for `n` workers.
    ///
    /// Returns [`Error::InvalidConfiguration`][crate::error::Error] if `n`
    /// is outside `[1, 256]`.
    pub fn new(n: usize) -> Result<Self> {
        let state = Arc::new(MutexState::new(n)?);
        Ok(Self { state })
    }

    /// Number of workers this lock supports.
    pub fn worker_count(&self) -> usize {
        self.state.worker_count()
    }

    /// The shared state, for inspection.
    pub fn state(&self) -> &MutexState {
        &self.state
    }

    /// Blocks (busy-waiting) until worker `i` may enter the critical
    /// section.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range, or if worker `i` already holds or is
    /// contending for the lock (its ticket is nonzero).
    pub fn acquire(&self, i: usize) {
        let n = self.state.worker_count();
        assert!(i < n, "worker index {} out of range 0..{}", i, n);
        assert_eq!(
            self.state.ticket(i),
            0,
            "worker {} called acquire while already contending or holding",
            i
        );

        // Ticket assignment. The scan must happen between the two choosing
        // stores: anyone who sees choosing[i] == false afterwards also sees
        // the final ticket value.
        self.state.set_choosing(i, true);
        let ticket = 1 + self.state.max_ticket();
        self.state.set_ticket(i, ticket);
        self.state.set_choosing(i, false);

        debug!("worker {} took ticket {}", i, ticket);

        // Doorway: wait out each other worker in index order.
        for j in 0..n {
            if j == i {
                continue;
            }

            // Worker j is mid-assignment; its ticket is not yet comparable.
            while self.state.choosing(j) {
                std::hint::spin_loop();
            }

            while is_ahead(self.state.ticket(j), j, ticket, i) {
                std::hint::spin_loop();
            }
        }

        debug!("worker {} entering critical section", i);
    }

    /// Releases the lock held by worker `i` by zeroing its ticket.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range or worker `i` does not hold the lock.
    pub fn release(&self, i: usize) {
        let n = self.state.worker_count();
        assert!(i < n, "worker index {} out of range 0..{}", i, n);
        assert_ne!(
            self.state.ticket(i),
            0,
            "worker {} called release without holding the lock",
            i
        );

        self.state.set_ticket(i, 0);
        debug!("worker {} released", i);
    }

    /// Acquires the lock for worker `i` and returns a guard that releases
    /// on drop.
    pub fn lock(&self, i: usize) -> BakeryGuard<'_> {
        self.acquire(i);
        BakeryGuard { lock: self, worker: i }
    }
}

impl std::fmt::Debug for BakeryLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BakeryLock").field("state", &self.state).finish()
    }
}

/// RAII guard returned by [`BakeryLock::lock`].
pub struct BakeryGuard<'a> {
    lock: &'a BakeryLock,
    worker: usize,
}

impl BakeryGuard<'_> {
    /// Index of the worker holding this guard.
    pub fn worker(&self) -> usize {
        self.worker
    }
}

impl Drop for BakeryGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(self.worker);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use test_log::test;

    use super::*;

    #[test]
    fn test_is_ahead_skips_idle_workers() {
        // ticket 0 means "not contending": never ahead of anyone.
        assert!(!is_ahead(0, 0, 5, 1));
        assert!(!is_ahead(0, 3, 0, 1));
    }

    #[test]
    fn test_is_ahead_smaller_ticket_wins() {
        assert!(is_ahead(3, 1, 5, 0));
        assert!(!is_ahead(5, 0, 3, 1));
    }

    #[test]
    fn test_is_ahead_tie_break_by_index() {
        // Equal tickets: the lower index is always ahead.
        assert!(is_ahead(5, 0, 5, 1));
        assert!(!is_ahead(5, 1, 5, 0));
    }

    #[test]
    fn test_is_ahead_is_strict_and_total() {
        // For any two distinct contending workers, exactly one is ahead.
        for (tj, j, ti, i) in [(1, 0, 2, 1), (2, 1, 1, 0), (4, 0, 4, 1), (4, 1, 4, 0)] {
            assert_ne!(is_ahead(tj, j, ti, i), is_ahead(ti, i, tj, j));
        }
    }

    #[test]
    fn test_single_worker_never_blocks() {
        let lock = BakeryLock::new(1).unwrap();

        lock.acquire(0);
        assert_ne!(lock.state().ticket(0), 0);
        lock.release(0);
        assert_eq!(lock.state().ticket(0), 0);
    }

    #[test]
    fn test_release_clears_ticket() {
        let lock = BakeryLock::new(3).unwrap();

        lock.acquire(1);
        lock.release(1);
        assert_eq!(lock.state().ticket(1), 0);

        // A cleared slot does not block anyone: worker 2 sails through.
        lock.acquire(2);
        lock.release(2);
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = BakeryLock::new(2).unwrap();

        {
            let guard = lock.lock(0);
            assert_eq!(guard.worker(), 0);
            assert_ne!(lock.state().ticket(0), 0);
        }
        assert_eq!(lock.state().ticket(0), 0);
    }

    #[test]
    #[should_panic(expected = "already contending or holding")]
    fn test_double_acquire_panics() {
        let lock = BakeryLock::new(1).unwrap();
        lock.acquire(0);
        lock.acquire(0);
    }

    #[test]
    #[should_panic(expected = "without holding the lock")]
    fn test_release_without_acquire_panics() {
        let lock = BakeryLock::new(1).unwrap();
        lock.release(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_acquire_out_of_range_panics() {
        let lock = BakeryLock::new(2).unwrap();
        lock.acquire(2);
    }

    #[test]
    fn test_tickets_increase_monotonically() {
        let lock = BakeryLock::new(2).unwrap();

        lock.acquire(0);
        let first = lock.state().ticket(0);
        lock.release(0);

        lock.acquire(1);
        let second = lock.state().ticket(1);
        lock.release(1);

        assert!(second > first);
    }

    #[test]
    fn test_fifo_admission_order() {
        // Worker 0 finishes its assignment phase strictly before worker 1
        // starts scanning, so worker 1 must not enter until 0 releases.
        let lock = Arc::new(BakeryLock::new(2).unwrap());
        let entered = Arc::new(AtomicBool::new(false));

        lock.acquire(0);

        let handle = {
            let lock = Arc::clone(&lock);
            let entered = Arc::clone(&entered);
            thread::spawn(move || {
                lock.acquire(1);
                entered.store(true, Ordering::SeqCst);
                lock.release(1);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert!(!entered.load(Ordering::SeqCst), "worker 1 jumped the queue");

        lock.release(0);
        handle.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_forced_equal_tickets_admit_lower_index() {
        // Synthesize the race where two max-scans produced the same value.
        let lock = BakeryLock::new(2).unwrap();
        lock.state().set_ticket(0, 5);
        lock.state().set_ticket(1, 5);

        assert!(is_ahead(lock.state().ticket(0), 0, lock.state().ticket(1), 1));
        assert!(!is_ahead(lock.state().ticket(1), 1, lock.state().ticket(0), 0));

        lock.state().set_ticket(0, 0);
        lock.state().set_ticket(1, 0);
    }

    #[test]
    fn test_mutual_exclusion_stress() {
        // The counter increment is deliberately a separate load and store:
        // if two workers ever overlap in the critical section, updates are
        // lost and the final count comes up short.
        const WORKERS: usize = 8;
        const ROUNDS: usize = 1_000;

        let lock = Arc::new(BakeryLock::new(WORKERS).unwrap());
        let counter = Arc::new(AtomicU64::new(0));

        let handles: Vec<_> = (0..WORKERS)
            .map(|i| {
                let lock = Arc::clone(&lock);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        let _guard = lock.lock(i);
                        let value = counter.load(Ordering::SeqCst);
                        counter.store(value + 1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        // Every join returning is also the starvation-freedom evidence.
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), (WORKERS * ROUNDS) as u64);
    }
}
