//! Error types for bakery-rs.

use thiserror::Error;

/// Errors surfaced by the lock and the protected-resource check.
///
/// Contract violations (double acquire, release without hold, index out of
/// range) are *not* represented here: they invalidate the protocol's
/// correctness argument, so they panic instead of returning an error.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum Error {
    /// Worker count outside the supported `[1, 256]` range.
    #[error("invalid worker count {n}: must be in 1..={max}", max = crate::state::MAX_WORKERS)]
    InvalidConfiguration { n: usize },

    /// The protected resource was found occupied by another worker while
    /// entering the critical section. The exclusion invariant itself has
    /// failed; there is no defined recovery.
    #[error("resource acquired by worker {intruder} but still in use by worker {occupant}")]
    MutualExclusionViolation { occupant: usize, intruder: usize },
}

/// Result type alias for bakery-rs operations.
pub type Result<T> = std::result::Result<T, Error>;
