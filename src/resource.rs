//! The protected resource: an occupant slot guarded by the lock.
//!
//! This is not part of the algorithm. It models the thing workers contend
//! for and doubles as the exclusion detector: entering an already-occupied
//! resource means the lock's core invariant failed, which is unrecoverable.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use crate::error::{Error, Result};

/// Sentinel occupant value meaning "free".
const FREE: usize = usize::MAX;

/// A single shared resource holding the id of the worker inside the
/// critical section, or nothing.
///
/// By contract only the current lock holder calls [`enter`][Self::enter]
/// and [`leave`][Self::leave]; the slot itself performs no locking.
pub struct Resource {
    occupant: AtomicUsize,
}

impl Resource {
    /// Creates a free resource.
    pub fn new() -> Self {
        Self { occupant: AtomicUsize::new(FREE) }
    }

    /// The worker currently occupying the resource, if any.
    pub fn occupant(&self) -> Option<usize> {
        match self.occupant.load(Ordering::SeqCst) {
            FREE => None,
            id => Some(id),
        }
    }

    /// Marks worker `i` as the occupant.
    ///
    /// Returns [`Error::MutualExclusionViolation`] if the resource is
    /// already occupied. That error means the protocol itself failed; the
    /// caller is expected to abort, not retry.
    pub fn enter(&self, i: usize) -> Result<()> {
        assert_ne!(i, FREE, "worker id collides with the free sentinel");

        match self.occupant.load(Ordering::SeqCst) {
            FREE => {
                self.occupant.store(i, Ordering::SeqCst);
                debug!("worker {} occupies the resource", i);
                Ok(())
            }
            occupant => Err(Error::MutualExclusionViolation { occupant, intruder: i }),
        }
    }

    /// Frees the resource previously entered by worker `i`.
    ///
    /// # Panics
    ///
    /// Panics if worker `i` is not the current occupant.
    pub fn leave(&self, i: usize) {
        assert_eq!(
            self.occupant.load(Ordering::SeqCst),
            i,
            "worker {} left a resource it does not occupy",
            i
        );
        self.occupant.store(FREE, Ordering::SeqCst);
        debug!("worker {} freed the resource", i);
    }
}

impl Default for Resource {
    fn default() -> Self {
        Self::new()
    }
}
