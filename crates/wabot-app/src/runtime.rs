//! Event loop shared by the terminal and the simulation.
//!
//! Pulls events from a [`Driver`], feeds them to the [`App`] and carries out
//! the returned actions on the same driver.

use crate::{App, AppAction, Driver};

/// Outcome of one [`Runtime::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No event was ready.
    Idle,
    /// One event was handled.
    Handled,
    /// The app asked to quit.
    Quit,
}

/// An [`App`] bound to the driver `D` that performs its effects.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime with the given driver and app.
    pub fn new(driver: D, app: App) -> Self {
        Self { driver, app }
    }

    /// Run the main event loop until the app quits.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot read an event or draw a frame.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.run_loop().await;
        if result.is_err() {
            // Cancel the timer even when the loop bails out
            let actions = self.app.teardown();
            self.execute_silently(actions);
        }
        self.driver.stop();
        result
    }

    async fn run_loop(&mut self) -> Result<(), D::Error> {
        if self.start()? {
            return Ok(());
        }
        loop {
            match self.step().await? {
                Step::Quit => return Ok(()),
                Step::Handled => {},
                Step::Idle => tokio::task::yield_now().await,
            }
        }
    }

    /// Mount the app and draw the first frame.
    ///
    /// Returns `true` if the app asked to quit.
    pub fn start(&mut self) -> Result<bool, D::Error> {
        self.driver.render(&self.app)?;
        let actions = self.app.mount();
        self.execute(actions)
    }

    /// Handle at most one event.
    pub async fn step(&mut self) -> Result<Step, D::Error> {
        let Some(event) = self.driver.next_event().await? else {
            return Ok(Step::Idle);
        };
        let actions = self.app.handle(event);
        if self.execute(actions)? { Ok(Step::Quit) } else { Ok(Step::Handled) }
    }

    /// Carry out `actions` in order. `true` means the App asked to quit.
    fn execute(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.driver.render(&self.app)?,
                AppAction::Quit => return Ok(true),
                AppAction::Request { request, call } => {
                    tracing::debug!(%request, call = call.label(), "dispatch");
                    self.driver.dispatch(request, call);
                },
                AppAction::StartPolling { every } => self.driver.start_polling(every),
                AppAction::StopPolling => self.driver.stop_polling(),
            }
        }
        Ok(false)
    }

    /// Execute teardown actions, logging render failures instead of
    /// returning them.
    fn execute_silently(&mut self, actions: Vec<AppAction>) {
        for action in actions {
            match action {
                AppAction::StopPolling => self.driver.stop_polling(),
                AppAction::StartPolling { every } => self.driver.start_polling(every),
                AppAction::Render => {
                    if let Err(e) = self.driver.render(&self.app) {
                        tracing::warn!(error = %e, "render failed during teardown");
                    }
                },
                AppAction::Quit | AppAction::Request { .. } => {
                    tracing::warn!(?action, "ignoring action emitted during teardown");
                },
            }
        }
    }

    /// The App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The App, mutably. Actions returned by its methods go to [`Self::apply`].
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Feed actions produced by calling [`App`] methods directly.
    ///
    /// Returns `true` if should quit.
    pub fn apply(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        self.execute(actions)
    }
}
