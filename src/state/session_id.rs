//! Session sequence numbers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one accepted connection for its whole lifetime.
///
/// Ids are handed out in acceptance order, so ordering by id is ordering
/// by connection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

/// Hands out [`SessionId`]s.
pub struct SessionIdGenerator {
    counter: AtomicU64,
}

/// The first connection is client#1.
const SESSION_ID_START: u64 = 1;

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(SESSION_ID_START),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> SessionId {
        SessionId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SessionIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
