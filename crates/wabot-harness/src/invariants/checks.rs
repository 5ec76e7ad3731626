//! The checks behind [`InvariantRegistry::standard`](super::InvariantRegistry::standard).

use std::collections::HashSet;

use super::{Invariant, InvariantResult, SystemSnapshot};

/// At most one poll timer is ever live.
///
/// Every `StartPolling` must be preceded by a `StopPolling` for the previous
/// timer. A start that lands on a live timer means two pollers could race.
pub struct SinglePollTimer;

impl Invariant for SinglePollTimer {
    fn name(&self) -> &'static str {
        "single_poll_timer"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.overlapping_timer_starts > 0 {
            return Err(self.violation(format!(
                "{} timer start(s) while a timer was already live",
                state.overlapping_timer_starts
            )));
        }
        Ok(())
    }
}

/// The driver's timer and the connection flow agree on polling.
pub struct TimerMatchesFlow;

impl Invariant for TimerMatchesFlow {
    fn name(&self) -> &'static str {
        "timer_matches_flow"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.timer_active != state.flow_polling {
            return Err(self.violation(format!(
                "driver timer active={} but flow polling={} (state {})",
                state.timer_active, state.flow_polling, state.connection_state
            )));
        }
        Ok(())
    }
}

/// Status polling only runs while a QR code is on screen.
///
/// Leaving the QR state or the connection screen must stop the timer.
pub struct PollingOnlyWhileDisplayingQr;

impl Invariant for PollingOnlyWhileDisplayingQr {
    fn name(&self) -> &'static str {
        "polling_only_while_displaying_qr"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.flow_polling && state.connection_state != "displaying_qr" {
            return Err(
                self.violation(format!("polling in state {}", state.connection_state))
            );
        }
        if state.timer_active && state.screen != wabot_app::Screen::Connection {
            return Err(self.violation(format!("timer live on screen {:?}", state.screen)));
        }
        Ok(())
    }
}

/// Cached lists never hold two rows with the same id.
pub struct UniqueRowIds;

impl Invariant for UniqueRowIds {
    fn name(&self) -> &'static str {
        "unique_row_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut seen = HashSet::new();
        if let Some(id) = state.restriction_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(self.violation(format!("restriction {id} cached twice")));
        }
        seen.clear();
        if let Some(id) = state.message_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(self.violation(format!("message {id} cached twice")));
        }
        Ok(())
    }
}

/// Open modals and confirmations target a row that is still cached.
pub struct ModalBoundToListedRow;

impl Invariant for ModalBoundToListedRow {
    fn name(&self) -> &'static str {
        "modal_bound_to_listed_row"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if let Some(id) = state.restriction_modal
            && !state.restriction_ids.contains(&id)
        {
            return Err(self.violation(format!("restriction modal open for missing row {id}")));
        }
        for (what, target) in
            [("edit modal", state.message_modal), ("delete confirmation", state.confirm_delete)]
        {
            if let Some(id) = target
                && !state.message_ids.contains(&id)
            {
                return Err(self.violation(format!("{what} open for missing message {id}")));
            }
        }
        Ok(())
    }
}
