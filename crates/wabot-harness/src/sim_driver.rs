//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`wabot_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Backend calls are queued instead of spawned. By default the driver answers
//! the oldest one whenever no event is queued, which plays out like a backend
//! that answers in request order. [`SimDriver::hold_responses`] switches that
//! off so tests can complete calls out of order or inject events in between.

use std::{collections::VecDeque, time::Duration};

use wabot_app::{ApiCall, App, AppEvent, Driver, KeyInput, RequestId};

use crate::{InvariantRegistry, SimBackend, SystemSnapshot, TimerLedger};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Simulation driver for deterministic testing.
pub struct SimDriver {
    backend: SimBackend,
    events: VecDeque<AppEvent>,
    in_flight: VecDeque<(RequestId, ApiCall)>,
    auto_resolve: bool,
    timer: TimerLedger,
    dispatched: Vec<(RequestId, ApiCall)>,
    renders: usize,
    stopped: bool,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver answering calls from `backend`.
    pub fn new(backend: SimBackend) -> Self {
        Self {
            backend,
            events: VecDeque::new(),
            in_flight: VecDeque::new(),
            auto_resolve: true,
            timer: TimerLedger::new(),
            dispatched: Vec::new(),
            renders: 0,
            stopped: false,
            invariants: None,
        }
    }

    /// Enable invariant checking.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Keep dispatched calls in flight until completed explicitly.
    pub fn hold_responses(&mut self) {
        self.auto_resolve = false;
    }

    /// Answer in-flight calls whenever the event queue is empty.
    pub fn release_responses(&mut self) {
        self.auto_resolve = true;
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject(&mut self, event: AppEvent) {
        self.events.push_back(event);
    }

    /// Inject a key press.
    pub fn inject_key(&mut self, key: KeyInput) {
        self.inject(AppEvent::Key(key));
    }

    /// Fire the poll timer once.
    ///
    /// Returns `false` and injects nothing when no timer is live.
    pub fn fire_poll_tick(&mut self) -> bool {
        if !self.timer.is_active() {
            return false;
        }
        self.inject(AppEvent::PollTick);
        true
    }

    /// Answer the oldest in-flight call and queue its completion.
    ///
    /// Returns the request answered.
    pub async fn resolve_next(&mut self) -> Option<RequestId> {
        let (request, call) = self.in_flight.pop_front()?;
        let event = self.answer(request, call).await;
        self.events.push_back(event);
        Some(request)
    }

    /// Answer every in-flight call in dispatch order.
    pub async fn resolve_all(&mut self) -> usize {
        let mut answered = 0;
        while self.resolve_next().await.is_some() {
            answered += 1;
        }
        answered
    }

    /// Answer one specific in-flight call.
    ///
    /// Returns `false` if `request` is not in flight.
    pub async fn complete(&mut self, request: RequestId) -> bool {
        let Some(index) = self.in_flight.iter().position(|(id, _)| *id == request) else {
            return false;
        };
        let Some((request, call)) = self.in_flight.remove(index) else {
            return false;
        };
        let event = self.answer(request, call).await;
        self.events.push_back(event);
        true
    }

    /// Complete `request` with a transport failure instead of asking the
    /// backend.
    pub fn fail(&mut self, request: RequestId, error: impl Into<String>) -> bool {
        let Some(index) = self.in_flight.iter().position(|(id, _)| *id == request) else {
            return false;
        };
        self.in_flight.remove(index);
        self.events.push_back(AppEvent::Api { request, response: Err(error.into()) });
        true
    }

    async fn answer(&self, request: RequestId, call: ApiCall) -> AppEvent {
        let response = wabot_app::execute(&self.backend, call).await.map_err(|e| e.to_string());
        AppEvent::Api { request, response }
    }

    /// Calls dispatched but not answered yet, oldest first.
    pub fn in_flight(&self) -> impl Iterator<Item = &(RequestId, ApiCall)> {
        self.in_flight.iter()
    }

    /// Every call ever dispatched, in order.
    pub fn dispatched(&self) -> &[(RequestId, ApiCall)] {
        &self.dispatched
    }

    /// Check if there are queued events or calls to answer.
    pub fn has_pending(&self) -> bool {
        !self.events.is_empty() || (self.auto_resolve && !self.in_flight.is_empty())
    }

    /// Poll timer as seen by this driver.
    pub fn timer(&self) -> &TimerLedger {
        &self.timer
    }

    /// Frames rendered so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Whether [`Driver::stop`] was called.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Backend answering calls.
    pub fn backend(&self) -> &SimBackend {
        &self.backend
    }

    /// Create a snapshot from App state for invariant checking.
    pub fn snapshot(&self, app: &App) -> SystemSnapshot {
        SystemSnapshot::capture(app, &self.timer)
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            registry.assert_all(&self.snapshot(app), context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.events.pop_front() {
            return Ok(Some(event));
        }
        if !self.auto_resolve {
            return Ok(None);
        }
        let Some((request, call)) = self.in_flight.pop_front() else {
            return Ok(None);
        };
        Ok(Some(self.answer(request, call).await))
    }

    fn dispatch(&mut self, request: RequestId, call: ApiCall) {
        if self.stopped {
            return;
        }
        self.dispatched.push((request, call.clone()));
        self.in_flight.push_back((request, call));
    }

    fn start_polling(&mut self, every: Duration) {
        self.timer.start(every);
    }

    fn stop_polling(&mut self) {
        self.timer.stop();
    }

    fn render(&mut self, _app: &App) -> Result<(), Self::Error> {
        if self.stopped {
            return Err(SimDriverError("render after stop".into()));
        }
        self.renders += 1;
        Ok(())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.events.clear();
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_tick_requires_live_timer() {
        let mut driver = SimDriver::new(SimBackend::new());
        assert!(!driver.fire_poll_tick());

        driver.start_polling(Duration::from_secs(3));
        assert!(driver.fire_poll_tick());
        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn auto_resolve_answers_oldest_call() {
        let mut driver = SimDriver::new(SimBackend::new().logged_in(true));
        driver.dispatch(RequestId::new(1), ApiCall::Status);
        driver.dispatch(RequestId::new(2), ApiCall::ListMessages);

        let event = driver.next_event().await.unwrap();
        assert!(matches!(
            event,
            Some(AppEvent::Api { request, response: Ok(_) }) if request == RequestId::new(1)
        ));
        assert_eq!(driver.in_flight().count(), 1);
    }

    #[tokio::test]
    async fn held_calls_wait_for_completion() {
        let mut driver = SimDriver::new(SimBackend::new());
        driver.hold_responses();
        driver.dispatch(RequestId::new(1), ApiCall::Status);
        driver.dispatch(RequestId::new(2), ApiCall::Status);

        assert!(driver.next_event().await.unwrap().is_none());
        assert!(driver.complete(RequestId::new(2)).await);
        assert!(matches!(
            driver.next_event().await.unwrap(),
            Some(AppEvent::Api { request, .. }) if request == RequestId::new(2)
        ));
    }
}
