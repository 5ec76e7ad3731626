//! Application state machine.
//!
//! This module defines the [`App`] state machine, which owns the three
//! screens and routes events between them, completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Mounts and unmounts screens on navigation (the connection screen's poll
//!   timer never outlives it).
//! - Routes backend responses to whichever screen issued the request.
//! - Maps keys to screen operations, modals first.
//! - Holds the notice popup, terminal size and navigation drawer.

use std::time::Duration;

use wabot_api::{MessageId, RestrictionId};

use crate::{
    ApiReply, AppAction, AppEvent, ConnectionFlow, KeyInput, MessageEditor, Notice, RequestId,
    RestrictionEditor, Screen, state::UiContext,
};

/// Terminals narrower than this collapse the header into a drawer.
pub const NARROW_WIDTH: u16 = 80;

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Screen on display.
    screen: Screen,
    /// Request ids and notice popup.
    ctx: UiContext,
    connection: ConnectionFlow,
    restrictions: RestrictionEditor,
    messages: MessageEditor,
    /// Drawer cursor. `None` when the drawer is closed.
    drawer: Option<usize>,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Backend base URL, shown in the status bar.
    api_base: String,
    /// Advanced on ticks while something is loading.
    spinner: usize,
}

impl App {
    /// Create an App on the connection screen. Call [`App::mount`] to start.
    pub fn new(api_base: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            screen: Screen::Connection,
            ctx: UiContext::default(),
            connection: ConnectionFlow::new(poll_interval),
            restrictions: RestrictionEditor::new(),
            messages: MessageEditor::new(),
            drawer: None,
            terminal_size: (80, 24),
            api_base: api_base.into(),
            spinner: 0,
        }
    }

    /// Mount the current screen.
    pub fn mount(&mut self) -> Vec<AppAction> {
        tracing::info!(screen = self.screen.title(), "mount");
        self.mount_screen()
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => {
                if self.is_loading() {
                    self.spinner = self.spinner.wrapping_add(1);
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                if !self.is_narrow() {
                    self.drawer = None;
                }
                vec![AppAction::Render]
            },
            AppEvent::PollTick => self.connection.poll_tick(&mut self.ctx),
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Api { request, response } => self.handle_response(request, response),
        }
    }

    fn handle_response(
        &mut self,
        request: RequestId,
        response: Result<ApiReply, String>,
    ) -> Vec<AppAction> {
        if self.connection.owns(request) {
            self.connection.handle_response(&mut self.ctx, request, response)
        } else if self.restrictions.owns(request) {
            self.restrictions.handle_response(request, response)
        } else if self.messages.owns(request) {
            self.messages.handle_response(&mut self.ctx, request, response)
        } else {
            tracing::debug!(%request, "dropping response nobody is waiting for");
            vec![]
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if key == KeyInput::Interrupt {
            return self.quit();
        }
        if self.ctx.dismiss_notice() {
            return vec![AppAction::Render];
        }
        if let Some(cursor) = self.drawer {
            return self.drawer_key(cursor, key);
        }

        match self.screen {
            Screen::Restrictions if self.restrictions.modal().is_some() => {
                return self.restrictions.handle_modal_key(&mut self.ctx, key);
            },
            Screen::DefaultMessages if self.messages.is_capturing() => {
                return self.messages.handle_key(&mut self.ctx, key);
            },
            _ => {},
        }

        match key {
            KeyInput::Char('q') | KeyInput::Esc => self.quit(),
            KeyInput::Tab => self.navigate(self.screen.next()),
            KeyInput::Char(c @ '1'..='9') => {
                Screen::from_digit(c).map_or_else(Vec::new, |screen| self.navigate(screen))
            },
            KeyInput::Char('m') if self.is_narrow() => {
                self.drawer = Some(self.screen.index());
                vec![AppAction::Render]
            },
            key => self.screen_key(key),
        }
    }

    fn screen_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match (self.screen, key) {
            (Screen::Connection, KeyInput::Char('t')) => self.test_connection(),
            (Screen::Connection, KeyInput::Char('r')) => self.reconnect(),

            (Screen::Restrictions, KeyInput::Up) => self.restrictions.select_prev(),
            (Screen::Restrictions, KeyInput::Down) => self.restrictions.select_next(),
            (Screen::Restrictions, KeyInput::Enter | KeyInput::Char('e')) => {
                self.restrictions.edit_selected()
            },

            (Screen::DefaultMessages, KeyInput::Up) => self.messages.select_prev(),
            (Screen::DefaultMessages, KeyInput::Down) => self.messages.select_next(),
            (Screen::DefaultMessages, KeyInput::Char('a')) => self.messages.add(),
            (Screen::DefaultMessages, KeyInput::Enter | KeyInput::Char('e')) => {
                self.messages.edit_selected()
            },
            (Screen::DefaultMessages, KeyInput::Char('d') | KeyInput::Delete) => {
                self.messages.request_delete_selected()
            },

            _ => vec![],
        }
    }

    fn drawer_key(&mut self, cursor: usize, key: KeyInput) -> Vec<AppAction> {
        let last = Screen::ALL.len() - 1;
        match key {
            KeyInput::Up => {
                self.drawer = Some(cursor.saturating_sub(1));
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                self.drawer = Some((cursor + 1).min(last));
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                self.drawer = None;
                let target = Screen::ALL.get(cursor).copied().unwrap_or(self.screen);
                let mut actions = self.navigate(target);
                actions.push(AppAction::Render);
                actions
            },
            KeyInput::Char(c @ '1'..='9') => {
                self.drawer = None;
                let mut actions =
                    Screen::from_digit(c).map_or_else(Vec::new, |screen| self.navigate(screen));
                actions.push(AppAction::Render);
                actions
            },
            KeyInput::Esc | KeyInput::Char('m') => {
                self.drawer = None;
                vec![AppAction::Render]
            },
            _ => vec![],
        }
    }

    /// Switch screens: unmount the current one, mount the target.
    pub fn navigate(&mut self, screen: Screen) -> Vec<AppAction> {
        if screen == self.screen {
            return vec![];
        }
        tracing::info!(from = self.screen.title(), to = screen.title(), "navigate");
        let mut actions = self.unmount_screen();
        self.screen = screen;
        actions.extend(self.mount_screen());
        actions
    }

    fn mount_screen(&mut self) -> Vec<AppAction> {
        match self.screen {
            Screen::Connection => self.connection.mount(&mut self.ctx),
            Screen::Restrictions => self.restrictions.mount(&mut self.ctx),
            Screen::DefaultMessages => self.messages.mount(&mut self.ctx),
        }
    }

    fn unmount_screen(&mut self) -> Vec<AppAction> {
        match self.screen {
            Screen::Connection => self.connection.unmount(),
            Screen::Restrictions => {
                self.restrictions.unmount();
                vec![]
            },
            Screen::DefaultMessages => {
                self.messages.unmount();
                vec![]
            },
        }
    }

    /// Unmount the current screen, cancelling its timer.
    pub fn teardown(&mut self) -> Vec<AppAction> {
        self.unmount_screen()
    }

    /// Tear down and quit.
    pub fn quit(&mut self) -> Vec<AppAction> {
        let mut actions = self.teardown();
        actions.push(AppAction::Quit);
        actions
    }

    /// Re-check the WhatsApp session (connection screen, connected state).
    pub fn test_connection(&mut self) -> Vec<AppAction> {
        if self.screen != Screen::Connection {
            return vec![];
        }
        self.connection.test_connection(&mut self.ctx)
    }

    /// Reconnect, regenerate the QR code or retry, depending on the state.
    pub fn reconnect(&mut self) -> Vec<AppAction> {
        if self.screen != Screen::Connection {
            return vec![];
        }
        self.connection.reconnect(&mut self.ctx)
    }

    /// Open the edit modal for restriction `id`.
    pub fn edit_restriction(&mut self, id: RestrictionId) -> Vec<AppAction> {
        if self.screen != Screen::Restrictions {
            return vec![];
        }
        self.restrictions.edit(id)
    }

    /// Open an empty create modal for a default message.
    pub fn add_message(&mut self) -> Vec<AppAction> {
        if self.screen != Screen::DefaultMessages {
            return vec![];
        }
        self.messages.add()
    }

    /// Open the edit modal for default message `id`.
    pub fn edit_message(&mut self, id: MessageId) -> Vec<AppAction> {
        if self.screen != Screen::DefaultMessages {
            return vec![];
        }
        self.messages.edit(id)
    }

    /// Ask to delete default message `id`.
    pub fn delete_message(&mut self, id: MessageId) -> Vec<AppAction> {
        if self.screen != Screen::DefaultMessages {
            return vec![];
        }
        self.messages.request_delete(id)
    }

    /// Answer the pending delete confirmation.
    pub fn confirm_delete(&mut self, accept: bool) -> Vec<AppAction> {
        self.messages.confirm(&mut self.ctx, accept)
    }

    /// Replace the draft in the open modal of the current screen.
    pub fn set_draft(&mut self, text: &str) -> Vec<AppAction> {
        match self.screen {
            Screen::Connection => vec![],
            Screen::Restrictions => self.restrictions.set_draft(text),
            Screen::DefaultMessages => self.messages.set_draft(text),
        }
    }

    /// Submit the open modal of the current screen.
    pub fn submit(&mut self) -> Vec<AppAction> {
        match self.screen {
            Screen::Connection => vec![],
            Screen::Restrictions => self.restrictions.submit(&mut self.ctx),
            Screen::DefaultMessages => self.messages.save(&mut self.ctx),
        }
    }

    /// Close the open modal of the current screen without saving.
    pub fn cancel(&mut self) -> Vec<AppAction> {
        match self.screen {
            Screen::Connection => vec![],
            Screen::Restrictions => self.restrictions.cancel(),
            Screen::DefaultMessages => self.messages.cancel(),
        }
    }

    /// Raise a notice popup.
    pub fn notify(&mut self, notice: Notice) {
        self.ctx.notify(notice);
    }

    /// Whether any visible request is in flight.
    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::Connection => self.connection.is_busy(),
            Screen::Restrictions => {
                self.restrictions.load_state().is_loading() || self.restrictions.is_updating()
            },
            Screen::DefaultMessages => {
                self.messages.load_state().is_loading() || self.messages.is_processing()
            },
        }
    }

    /// Whether the header is collapsed into a drawer.
    pub fn is_narrow(&self) -> bool {
        self.terminal_size.0 < NARROW_WIDTH
    }

    /// Current screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Connection screen state.
    pub fn connection(&self) -> &ConnectionFlow {
        &self.connection
    }

    /// Restrictions screen state.
    pub fn restrictions(&self) -> &RestrictionEditor {
        &self.restrictions
    }

    /// Default messages screen state.
    pub fn messages(&self) -> &MessageEditor {
        &self.messages
    }

    /// Notice popup. `None` if no notice.
    pub fn notice(&self) -> Option<&Notice> {
        self.ctx.notice()
    }

    /// Drawer cursor. `None` when the drawer is closed.
    pub fn drawer(&self) -> Option<usize> {
        self.drawer
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Backend base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Spinner frame counter.
    pub fn spinner(&self) -> usize {
        self.spinner
    }
}
