//! Scripted end-to-end runs of the real runtime against [`SimBackend`].
//!
//! A [`Scenario`] owns a [`Runtime`] over a [`SimDriver`]. Every input is
//! followed by [`Scenario::settle`], which handles events until the driver has
//! nothing left, checking the standard invariants after each step.

#![allow(clippy::panic, reason = "Scenario failures abort the calling test")]

use wabot_app::{
    App, AppAction, ConnectionState, DEFAULT_POLL_INTERVAL, KeyInput, Runtime, Step,
};

use crate::{InvariantRegistry, SimBackend, SimDriver};

/// Base URL shown by simulated apps.
const SIM_BASE_URL: &str = "http://sim.invalid/whatsapp/";

/// Upper bound on events handled by one settle.
const MAX_STEPS: usize = 1_000;

/// A runtime under simulation.
pub struct Scenario {
    runtime: Runtime<SimDriver>,
    backend: SimBackend,
    history: Vec<&'static str>,
    quit: bool,
}

impl Scenario {
    /// Build an unstarted scenario over `backend` with invariants enabled.
    pub fn new(backend: SimBackend) -> Self {
        let driver = SimDriver::new(backend.clone()).with_invariants(InvariantRegistry::standard());
        let app = App::new(SIM_BASE_URL, DEFAULT_POLL_INTERVAL);
        let history = vec![app.connection().state().name()];
        Self { runtime: Runtime::new(driver, app), backend, history, quit: false }
    }

    /// Build, mount and settle.
    pub async fn started(backend: SimBackend) -> Self {
        let mut scenario = Self::new(backend);
        scenario.start().await;
        scenario
    }

    /// Mount the app and settle.
    ///
    /// # Panics
    ///
    /// Panics if the driver fails.
    pub async fn start(&mut self) {
        match self.runtime.start() {
            Ok(quit) => self.quit |= quit,
            Err(e) => panic!("start failed: {e}"),
        }
        self.observe("start");
        self.settle().await;
    }

    /// Handle events until the driver is idle or the app quits.
    ///
    /// # Panics
    ///
    /// Panics on driver errors, invariant violations, or if the run does not
    /// go idle within a bounded number of steps.
    pub async fn settle(&mut self) {
        for _ in 0..MAX_STEPS {
            if self.quit {
                return;
            }
            let step = match self.runtime.step().await {
                Ok(step) => step,
                Err(e) => panic!("step failed: {e}"),
            };
            self.observe("settle");
            match step {
                Step::Idle => return,
                Step::Quit => self.quit = true,
                Step::Handled => {},
            }
        }
        panic!("scenario did not settle within {MAX_STEPS} steps");
    }

    /// Press one key and settle.
    pub async fn key(&mut self, key: KeyInput) {
        self.runtime.driver_mut().inject_key(key);
        self.settle().await;
    }

    /// Press several keys, settling after each.
    pub async fn keys(&mut self, keys: impl IntoIterator<Item = KeyInput>) {
        for key in keys {
            self.key(key).await;
        }
    }

    /// Type `text` one character at a time.
    pub async fn type_text(&mut self, text: &str) {
        self.keys(text.chars().map(KeyInput::Char)).await;
    }

    /// Fire the poll timer once and settle.
    ///
    /// Returns `false` if no timer was live.
    pub async fn poll(&mut self) -> bool {
        let fired = self.runtime.driver_mut().fire_poll_tick();
        if fired {
            self.settle().await;
        }
        fired
    }

    /// Call an [`App`] operation directly and settle.
    ///
    /// # Panics
    ///
    /// Panics if the driver fails while executing the actions.
    pub async fn act(&mut self, op: impl FnOnce(&mut App) -> Vec<AppAction>) {
        let actions = op(self.runtime.app_mut());
        match self.runtime.apply(actions) {
            Ok(quit) => self.quit |= quit,
            Err(e) => panic!("apply failed: {e}"),
        }
        self.observe("act");
        self.settle().await;
    }

    fn observe(&mut self, context: &str) {
        let app = self.runtime.app();
        self.runtime.driver().check_invariants(app, context);
        let name = app.connection().state().name();
        if self.history.last() != Some(&name) {
            self.history.push(name);
        }
    }

    /// Current app state.
    pub fn app(&self) -> &App {
        self.runtime.app()
    }

    /// Connection flow state.
    pub fn connection_state(&self) -> &ConnectionState {
        self.app().connection().state()
    }

    /// Simulation driver.
    pub fn driver(&self) -> &SimDriver {
        self.runtime.driver()
    }

    /// Mutable simulation driver, for holding and completing calls.
    pub fn driver_mut(&mut self) -> &mut SimDriver {
        self.runtime.driver_mut()
    }

    /// Backend shared with the driver.
    pub fn backend(&self) -> &SimBackend {
        &self.backend
    }

    /// Distinct connection states seen, in order.
    pub fn state_history(&self) -> &[&'static str] {
        &self.history
    }

    /// Whether the app asked to quit.
    pub fn has_quit(&self) -> bool {
        self.quit
    }
}
