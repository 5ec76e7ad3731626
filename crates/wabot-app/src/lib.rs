//! Application layer for the WhatsApp bot admin console
//!
//! Pure state machines and a generic runtime, so the screens run unchanged
//! against the real backend and against the simulation harness.
//!
//! # Components
//!
//! - [`App`]: top-level state machine (navigation, notices, key routing)
//! - [`ConnectionFlow`]: QR login and status polling
//! - [`RestrictionEditor`]: restriction list and edit modal
//! - [`MessageEditor`]: default message list, modal and delete confirmation
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic event loop over a [`Driver`]
//! - [`Dispatcher`] and [`PollTimer`]: tokio plumbing shared by drivers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod connection;
mod dispatch;
mod driver;
mod event;
mod input;
mod messages;
mod request;
mod restrictions;
mod runtime;
mod screen;
mod state;
mod text_input;

pub use action::{ApiCall, AppAction};
pub use app::{App, NARROW_WIDTH};
pub use connection::{ConnectionFlow, DEFAULT_POLL_INTERVAL};
pub use dispatch::{Dispatcher, MIN_POLL_INTERVAL, PollTimer, execute};
pub use driver::Driver;
pub use event::{ApiReply, AppEvent};
pub use input::KeyInput;
pub use messages::{MessageEditor, MessageModal, MessageModalMode};
pub use request::{RequestId, RequestIds};
pub use restrictions::{
    MAIN_PROMPT, RestrictionEditor, RestrictionModal, ValueKind, friendly_name,
};
pub use runtime::{Runtime, Step};
pub use screen::Screen;
pub use state::{ConnectionState, LoadState, Notice, NoticeKind};
pub use text_input::TextInput;
