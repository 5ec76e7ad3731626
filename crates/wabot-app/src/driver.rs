//! The I/O boundary of the console.
//!
//! Everything that touches the terminal, the network or the clock sits behind
//! [`Driver`]; [`crate::Runtime`] only moves events in and actions out.

use std::{future::Future, time::Duration};

use crate::{ApiCall, App, AppEvent, RequestId};

/// Side effects requested by the App, and the events that answer them.
///
/// # Implementations
///
/// - **TUI**: crossterm events, reqwest calls on tokio tasks, a tokio poll timer
/// - **Simulation**: queued events, an in-memory backend, a virtual timer
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next event.
    ///
    /// Returns `None` if no event is ready.
    fn next_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Start a backend call. Its completion must come back through
    /// [`Driver::next_event`] as [`AppEvent::Api`] carrying `request`.
    fn dispatch(&mut self, request: RequestId, call: ApiCall);

    /// Start emitting [`AppEvent::PollTick`] every `every`, replacing any
    /// running timer.
    fn start_polling(&mut self, every: Duration);

    /// Stop emitting [`AppEvent::PollTick`].
    fn stop_polling(&mut self);

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release resources. Called once after the loop ends.
    fn stop(&mut self);
}
