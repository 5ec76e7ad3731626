//! Properties checked after every simulated step.
//!
//! Scenario tests assert outcomes; the checks here assert what must hold at
//! every point in between: the poll timer lifecycle and the consistency of
//! the list caches with their modals.
//!
//! Each check reads a [`SystemSnapshot`] built from the App and the driver's
//! [`TimerLedger`](crate::TimerLedger):
//!
//! ```ignore
//! let registry = InvariantRegistry::standard();
//! registry.check_all(&SystemSnapshot::capture(&app, &ledger))?;
//! ```

mod checks;
mod snapshot;

pub use checks::{
    ModalBoundToListedRow, PollingOnlyWhileDisplayingQr, SinglePollTimer, TimerMatchesFlow,
    UniqueRowIds,
};
pub use snapshot::SystemSnapshot;

/// Outcome of a single check.
pub type InvariantResult = Result<(), Violation>;

/// A failed check.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Check that failed.
    pub invariant: &'static str,
    /// What the snapshot showed.
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of a [`SystemSnapshot`].
pub trait Invariant: Send + Sync {
    /// Name used in violation reports.
    fn name(&self) -> &'static str;

    /// Inspect `state`.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;

    /// Violation of this check carrying `message`.
    fn violation(&self, message: String) -> Violation {
        Violation { invariant: self.name(), message }
    }
}

/// Set of checks run together.
#[derive(Default)]
pub struct InvariantRegistry {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// Registry with no checks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every check in this module:
    ///
    /// - [`SinglePollTimer`]
    /// - [`TimerMatchesFlow`]
    /// - [`PollingOnlyWhileDisplayingQr`]
    /// - [`UniqueRowIds`]
    /// - [`ModalBoundToListedRow`]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(SinglePollTimer);
        registry.add(TimerMatchesFlow);
        registry.add(PollingOnlyWhileDisplayingQr);
        registry.add(UniqueRowIds);
        registry.add(ModalBoundToListedRow);
        registry
    }

    /// Register `invariant`.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Run every check, collecting all violations.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let violations: Vec<Violation> =
            self.invariants.iter().filter_map(|check| check.check(state).err()).collect();
        if violations.is_empty() { Ok(()) } else { Err(violations) }
    }

    /// Run every check and panic with all violations, labelled with `context`.
    #[allow(clippy::panic, reason = "Aborts the calling test")]
    pub fn assert_all(&self, state: &SystemSnapshot, context: &str) {
        if let Err(violations) = self.check_all(state) {
            let report: Vec<String> = violations.iter().map(ToString::to_string).collect();
            panic!("invariants broken after {context}:\n  {}", report.join("\n  "));
        }
    }

    /// Number of registered checks.
    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    /// Whether no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_runs_every_check() {
        assert_eq!(InvariantRegistry::standard().len(), 5);
        assert!(InvariantRegistry::new().is_empty());
    }

    #[test]
    fn unmounted_snapshot_is_consistent() {
        let registry = InvariantRegistry::standard();
        assert!(registry.check_all(&SystemSnapshot::default()).is_ok());
    }
}
