//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Backend calls and the status
//! poll timer run as tokio tasks that report back over a channel.

use std::{
    io::{self, Stdout, stdout},
    sync::Arc,
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{
        self as term, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc;
use wabot_api::AdminApi;
use wabot_app::{
    ApiCall, App, AppEvent, Dispatcher, Driver, KeyInput, PollTimer, RequestId,
};

use crate::{qr::QrCache, ui};

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal stopped delivering input.
    #[error("terminal input closed")]
    InputClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Owns the terminal, the backend call dispatcher and the poll timer. The QR
/// matrix is cached here so it is only rebuilt when the payload changes.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    events: mpsc::UnboundedReceiver<AppEvent>,
    dispatcher: Dispatcher,
    poll_timer: PollTimer,
    qr: QrCache,
    /// Initial size, delivered before any terminal event.
    pending: Option<AppEvent>,
    tick: Duration,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    ///
    /// `tick` is how often [`AppEvent::Tick`] fires while nothing else
    /// happens.
    pub fn new(api: Arc<dyn AdminApi>, tick: Duration) -> Result<Self, TerminalError> {
        let (cols, rows) = term::size()?;

        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let (tx, events) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            events,
            dispatcher: Dispatcher::new(api, tx.clone()),
            poll_timer: PollTimer::new(tx),
            qr: QrCache::default(),
            pending: Some(AppEvent::Resize(cols, rows)),
            tick,
        })
    }

    /// Convert one item of the crossterm event stream.
    ///
    /// The end of the stream is an error: no further input can arrive, and
    /// the caller would otherwise poll a finished stream forever.
    fn convert_event(
        maybe_event: Option<io::Result<Event>>,
    ) -> Result<Option<AppEvent>, TerminalError> {
        match maybe_event {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                Ok(Self::convert_key(key).map(AppEvent::Key))
            },
            Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
            Some(Ok(_)) => Ok(None),
            Some(Err(e)) => Err(TerminalError::Io(e)),
            None => Err(TerminalError::InputClosed),
        }
    }

    /// Convert a crossterm key press to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(KeyInput::Interrupt),
                KeyCode::Char('s') => Some(KeyInput::Save),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn next_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        if let Some(event) = self.pending.take() {
            return Ok(Some(event));
        }

        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => Self::convert_event(maybe_event),

            // Backend completions and poll ticks
            maybe_event = self.events.recv() => Ok(maybe_event),

            // Spinner tick
            () = tokio::time::sleep(self.tick) => Ok(Some(AppEvent::Tick)),
        }
    }

    fn dispatch(&mut self, request: RequestId, call: ApiCall) {
        tracing::debug!(%request, call = call.label(), "dispatching backend call");
        self.dispatcher.dispatch(request, call);
    }

    fn start_polling(&mut self, every: Duration) {
        self.poll_timer.start(every);
    }

    fn stop_polling(&mut self) {
        self.poll_timer.stop();
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.qr.refresh(app);
        let qr = self.qr.matrix();
        self.terminal.draw(|frame| ui::render(frame, app, qr))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.poll_timer.stop();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
