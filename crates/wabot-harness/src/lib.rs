//! Deterministic simulation harness for the admin console.
//!
//! In-memory implementations of the backend ([`SimBackend`]) and of the
//! [`wabot_app::Driver`] trait ([`SimDriver`]), so the production
//! [`wabot_app::Runtime`] runs unchanged under test with full control over
//! response timing and poll ticks.
//!
//! [`Scenario`] wraps the runtime for scripted tests and checks
//! [`InvariantRegistry::standard()`] after every step, so a timer leak or a
//! stale cache fails the test at the step that caused it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod scenario;
pub mod sim_backend;
pub mod sim_driver;
pub mod timer;

pub use invariants::{
    Invariant, InvariantRegistry, InvariantResult, ModalBoundToListedRow,
    PollingOnlyWhileDisplayingQr, SinglePollTimer, SystemSnapshot, TimerMatchesFlow,
    UniqueRowIds, Violation,
};
pub use scenario::Scenario;
pub use sim_backend::{Endpoint, RecordedCall, SimBackend};
pub use sim_driver::{SimDriver, SimDriverError};
pub use timer::TimerLedger;
