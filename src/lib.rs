//! # bakery-rs: Lamport's Bakery Algorithm in Rust
//!
//! **`bakery-rs`** implements Lamport's bakery algorithm: mutual exclusion
//! for N concurrent workers built from nothing but atomic loads and stores.
//! No compare-and-swap, no OS mutex, no wait queue --- the ticket protocol
//! *is* the lock.
//!
//! ## How it works
//!
//! Each worker owns a stable index in `[0, n)` and two shared slots: a
//! *choosing* flag and a *ticket*. To enter, a worker raises its choosing
//! flag, scans every ticket, takes one past the maximum, and lowers the
//! flag. It then waits at the doorway: for each other worker, first until
//! that worker is done choosing, then until that worker is no longer ahead
//! in (ticket, index) order. Tied tickets are possible --- the scan races
//! with other assignments --- and are broken by index, keeping the order
//! total. At most one worker ever finds itself first in line.
//!
//! ## Key properties
//!
//! - **Mutual exclusion**: at most one worker in the critical section.
//! - **Starvation-freedom**: every contender is eventually admitted.
//! - **Load/store only**: correctness relies on sequentially-consistent
//!   atomics, not on read-modify-write instructions.
//! - **Busy-waiting**: [`acquire`][crate::lock::BakeryLock::acquire] spins;
//!   it never parks the thread.
//!
//! ## Basic Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use bakery_rs::lock::BakeryLock;
//!
//! let lock = Arc::new(BakeryLock::new(4)?);
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let lock = Arc::clone(&lock);
//!         thread::spawn(move || {
//!             let _guard = lock.lock(i);
//!             // critical section
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok::<(), bakery_rs::error::Error>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`lock`]**: the algorithm --- [`BakeryLock`][crate::lock::BakeryLock]
//!   with `acquire`/`release` and an RAII guard.
//! - **[`state`]**: the shared choosing flags and tickets.
//! - **[`resource`]**: an occupant-tracking resource that detects exclusion
//!   violations, used by the demo harness and the tests.

pub mod error;
pub mod lock;
pub mod resource;
pub mod state;
