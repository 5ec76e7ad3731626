//! Terminal admin console for the WhatsApp bot backend
//!
//! A thin shell over [`wabot_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`wabot_app::Runtime`].
//!
//! This crate only handles terminal input, rendering and QR drawing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod qr;
pub mod terminal;
pub mod ui;

pub use qr::{QrCache, QrError, QrMatrix};
pub use terminal::{TerminalDriver, TerminalError};
pub use wabot_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
