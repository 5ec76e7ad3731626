//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize), render ticks and the poll timer.
//! - Completed backend calls, delivered as [`ApiReply`] values.

use wabot_api::{DefaultMessage, QrPayload, Restriction};

use crate::{KeyInput, RequestId};

/// Events processed by the App state machine.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic render tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Status poll timer fired.
    PollTick,

    /// A backend call finished.
    Api {
        /// Id of the [`crate::AppAction::Request`] that issued the call.
        request: RequestId,
        /// Reply, or the error rendered as text.
        response: Result<ApiReply, String>,
    },
}

/// Successful result of an [`crate::ApiCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    /// Session login flag.
    Status {
        /// Whether the WhatsApp session is logged in.
        logged_in: bool,
    },

    /// QR pairing payload.
    Qr(QrPayload),

    /// Full restriction list.
    Restrictions(Vec<Restriction>),

    /// Row as stored after an update.
    RestrictionUpdated(Restriction),

    /// Full default message list.
    Messages(Vec<DefaultMessage>),

    /// Message as stored after creation.
    MessageCreated(DefaultMessage),

    /// Message as stored after an update.
    MessageUpdated(DefaultMessage),

    /// Message deleted.
    MessageDeleted,
}
