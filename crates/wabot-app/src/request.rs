//! Correlation ids for in-flight backend calls.

use std::fmt;

/// Identifies one backend call issued by the state machines.
///
/// Every [`crate::AppAction::Request`] carries a fresh id and the matching
/// [`crate::AppEvent::Api`] echoes it back. A state machine only accepts a
/// response whose id it is still waiting for, so late replies from superseded
/// calls are dropped instead of overwriting newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw id.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic [`RequestId`] allocator. Ids start at 1 and never repeat.
#[derive(Debug, Clone, Default)]
pub struct RequestIds {
    last: u64,
}

impl RequestIds {
    /// Create an allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> RequestId {
        self.last += 1;
        RequestId(self.last)
    }
}
