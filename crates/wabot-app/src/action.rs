//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute,
//! and [`ApiCall`], the backend operation carried by a request action.

use std::time::Duration;

use wabot_api::{MessageId, RestrictionId, RestrictionPatch};

use crate::RequestId;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Issue a backend call. The reply comes back as
    /// [`crate::AppEvent::Api`] with the same `request` id.
    Request {
        /// Correlation id.
        request: RequestId,
        /// Operation to perform.
        call: ApiCall,
    },

    /// Start the status poll timer, replacing any running one.
    StartPolling {
        /// Delay between [`crate::AppEvent::PollTick`] events.
        every: Duration,
    },

    /// Cancel the status poll timer.
    StopPolling,
}

/// One backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    /// Read the session login flag.
    Status,

    /// Fetch a QR pairing payload.
    Connect {
        /// Drop the current session before asking for a new QR code.
        disconnect_first: bool,
    },

    /// List restrictions.
    ListRestrictions,

    /// Update one restriction.
    UpdateRestriction {
        /// Row id.
        id: RestrictionId,
        /// Field to change.
        patch: RestrictionPatch,
    },

    /// List default messages.
    ListMessages,

    /// Create a default message.
    CreateMessage {
        /// Message body.
        text: String,
    },

    /// Replace a default message's text.
    UpdateMessage {
        /// Message id.
        id: MessageId,
        /// New body.
        text: String,
    },

    /// Delete a default message.
    DeleteMessage {
        /// Message id.
        id: MessageId,
    },
}

impl ApiCall {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Connect { disconnect_first: false } => "connect",
            Self::Connect { disconnect_first: true } => "disconnect+connect",
            Self::ListRestrictions => "list_restrictions",
            Self::UpdateRestriction { .. } => "update_restriction",
            Self::ListMessages => "list_messages",
            Self::CreateMessage { .. } => "create_message",
            Self::UpdateMessage { .. } => "update_message",
            Self::DeleteMessage { .. } => "delete_message",
        }
    }
}
