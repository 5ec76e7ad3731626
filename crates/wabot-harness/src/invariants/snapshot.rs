//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use wabot_api::{MessageId, RestrictionId};
use wabot_app::{App, MessageModalMode, Screen};

use crate::TimerLedger;

/// Snapshot of the App plus the driver-side timer.
#[derive(Debug, Clone)]
pub struct SystemSnapshot {
    /// Screen on display.
    pub screen: Screen,
    /// Connection flow state name.
    pub connection_state: &'static str,
    /// Whether the flow believes a poll timer is live.
    pub flow_polling: bool,
    /// Whether the driver has a live poll timer.
    pub timer_active: bool,
    /// Timer starts that found a timer already live.
    pub overlapping_timer_starts: usize,
    /// Cached restriction ids in backend order.
    pub restriction_ids: Vec<RestrictionId>,
    /// Row bound to the restriction modal.
    pub restriction_modal: Option<RestrictionId>,
    /// Cached default message ids in display order.
    pub message_ids: Vec<MessageId>,
    /// Row bound to the message edit modal.
    pub message_modal: Option<MessageId>,
    /// Row awaiting delete confirmation.
    pub confirm_delete: Option<MessageId>,
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        Self {
            screen: Screen::Connection,
            connection_state: "initializing",
            flow_polling: false,
            timer_active: false,
            overlapping_timer_starts: 0,
            restriction_ids: Vec::new(),
            restriction_modal: None,
            message_ids: Vec::new(),
            message_modal: None,
            confirm_delete: None,
        }
    }
}

impl SystemSnapshot {
    /// Capture App state and the timer as the driver sees it.
    pub fn capture(app: &App, timer: &TimerLedger) -> Self {
        let connection = app.connection();
        let restrictions = app.restrictions();
        let messages = app.messages();

        Self {
            screen: app.screen(),
            connection_state: connection.state().name(),
            flow_polling: connection.is_polling(),
            timer_active: timer.is_active(),
            overlapping_timer_starts: timer.overlapping_starts(),
            restriction_ids: restrictions.rows().iter().map(|r| r.id).collect(),
            restriction_modal: restrictions.modal().map(|m| m.id),
            message_ids: messages.messages().iter().map(|m| m.id).collect(),
            message_modal: messages.modal().and_then(|m| match m.mode {
                MessageModalMode::Edit(id) => Some(id),
                MessageModalMode::Create => None,
            }),
            confirm_delete: messages.confirming_delete().map(|m| m.id),
        }
    }
}
