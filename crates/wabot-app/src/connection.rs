//! QR login and status polling.
//!
//! [`ConnectionFlow`] drives the connection screen:
//!
//! ```text
//! Initializing --logged in--------------------------------> Connected
//!      |                                                      |   ^
//!      +--logged out--> LoadingQr --qr--> DisplayingQr --poll-+   |
//!                          ^                  |  (logged in)      |
//!                          +---- regenerate --+                   |
//!                          +---- reconnect / test logged out -----+
//! any request failure ----------------------------> Error --retry--> LoadingQr
//! ```
//!
//! The flow owns the poll timer's lifecycle but not the timer itself: it emits
//! [`AppAction::StartPolling`] and [`AppAction::StopPolling`] and tracks
//! whether one is live. It never starts a second timer while one is live, and
//! every transition out of `DisplayingQr` stops the timer in the same step.

use std::time::Duration;

use wabot_api::QrPayload;

use crate::{
    ApiCall, ApiReply, AppAction, ConnectionState, Notice, RequestId, state::UiContext,
};

/// Status poll period used unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Why a status request was issued. Decides what its answer means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusCheck {
    /// First check after mount.
    Initial,
    /// Timer-driven check while a QR code is displayed.
    Poll,
    /// User-requested check while connected.
    Test,
}

/// Connection screen state machine.
#[derive(Debug, Clone)]
pub struct ConnectionFlow {
    state: ConnectionState,
    poll_interval: Duration,
    /// A poll timer is live in the driver.
    polling: bool,
    pending_status: Option<(RequestId, StatusCheck)>,
    pending_qr: Option<RequestId>,
}

impl ConnectionFlow {
    /// Create an unmounted flow.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            state: ConnectionState::Initializing,
            poll_interval,
            polling: false,
            pending_status: None,
            pending_qr: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Whether a poll timer is live.
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Configured poll period.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Whether a status or QR request is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending_status.is_some() || self.pending_qr.is_some()
    }

    /// Whether `request` is a response this flow is waiting for.
    pub fn owns(&self, request: RequestId) -> bool {
        self.pending_qr == Some(request)
            || self.pending_status.is_some_and(|(id, _)| id == request)
    }

    pub(crate) fn mount(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        let mut actions = self.stop_poll();
        self.pending_qr = None;
        self.state = ConnectionState::Initializing;
        actions.extend(self.check_status(ctx, StatusCheck::Initial));
        actions.push(AppAction::Render);
        actions
    }

    /// Leave the screen: cancel the timer and forget in-flight requests.
    pub(crate) fn unmount(&mut self) -> Vec<AppAction> {
        self.pending_status = None;
        self.pending_qr = None;
        self.stop_poll()
    }

    pub(crate) fn poll_tick(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        if !self.polling || !self.state.is_displaying_qr() {
            tracing::debug!(state = self.state.name(), "poll tick ignored: not polling");
            return vec![];
        }
        if self.pending_status.is_some() {
            tracing::debug!("poll tick ignored: status check in flight");
            return vec![];
        }
        self.check_status(ctx, StatusCheck::Poll)
    }

    /// Re-check the session from the connected state.
    pub(crate) fn test_connection(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        if self.state != ConnectionState::Connected || self.pending_status.is_some() {
            return vec![];
        }
        self.check_status(ctx, StatusCheck::Test)
    }

    /// Reconnect when connected, regenerate the QR code when one is shown,
    /// retry after an error. Ignored while a first check or QR fetch runs.
    pub(crate) fn reconnect(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        match self.state {
            ConnectionState::Connected => self.begin_qr(ctx, true),
            ConnectionState::DisplayingQr { .. } | ConnectionState::Error { .. } => {
                self.begin_qr(ctx, false)
            },
            ConnectionState::Initializing | ConnectionState::LoadingQr => {
                tracing::debug!(state = self.state.name(), "reconnect ignored while loading");
                vec![]
            },
        }
    }

    /// Apply a response. The caller checks [`Self::owns`] first.
    pub(crate) fn handle_response(
        &mut self,
        ctx: &mut UiContext,
        request: RequestId,
        response: Result<ApiReply, String>,
    ) -> Vec<AppAction> {
        if self.pending_qr == Some(request) {
            self.pending_qr = None;
            return match response {
                Ok(ApiReply::Qr(qr)) => self.show_qr(qr),
                Ok(other) => self.fail(format!("unexpected reply to QR request: {other:?}")),
                Err(message) => self.fail(message),
            };
        }

        let Some((_, check)) = self.pending_status.take_if(|(id, _)| *id == request) else {
            tracing::debug!(%request, "dropping stale connection response");
            return vec![];
        };

        match response {
            Ok(ApiReply::Status { logged_in }) => self.on_status(ctx, check, logged_in),
            Ok(other) => self.fail(format!("unexpected reply to status request: {other:?}")),
            Err(message) => self.fail(message),
        }
    }

    fn on_status(
        &mut self,
        ctx: &mut UiContext,
        check: StatusCheck,
        logged_in: bool,
    ) -> Vec<AppAction> {
        tracing::debug!(?check, logged_in, "status");
        match (check, logged_in) {
            (StatusCheck::Initial | StatusCheck::Poll, true) => self.enter_connected(),
            (StatusCheck::Initial, false) => self.begin_qr(ctx, false),
            (StatusCheck::Poll, false) => vec![],
            (StatusCheck::Test, true) => {
                ctx.notify(Notice::info("WhatsApp connected"));
                vec![AppAction::Render]
            },
            (StatusCheck::Test, false) => {
                ctx.notify(Notice::error("WhatsApp disconnected"));
                self.begin_qr(ctx, false)
            },
        }
    }

    fn check_status(&mut self, ctx: &mut UiContext, check: StatusCheck) -> Vec<AppAction> {
        let request = ctx.next_request();
        self.pending_status = Some((request, check));
        vec![AppAction::Request { request, call: ApiCall::Status }]
    }

    fn begin_qr(&mut self, ctx: &mut UiContext, disconnect_first: bool) -> Vec<AppAction> {
        let mut actions = self.stop_poll();
        self.pending_status = None;

        let request = ctx.next_request();
        self.pending_qr = Some(request);
        self.transition(ConnectionState::LoadingQr);

        actions.push(AppAction::Request { request, call: ApiCall::Connect { disconnect_first } });
        actions.push(AppAction::Render);
        actions
    }

    fn show_qr(&mut self, qr: QrPayload) -> Vec<AppAction> {
        let mut actions = self.stop_poll();
        self.transition(ConnectionState::DisplayingQr { qr });
        self.polling = true;
        actions.push(AppAction::StartPolling { every: self.poll_interval });
        actions.push(AppAction::Render);
        actions
    }

    fn enter_connected(&mut self) -> Vec<AppAction> {
        let mut actions = self.stop_poll();
        self.transition(ConnectionState::Connected);
        actions.push(AppAction::Render);
        actions
    }

    fn fail(&mut self, message: String) -> Vec<AppAction> {
        tracing::warn!(state = self.state.name(), error = %message, "connection request failed");
        let mut actions = self.stop_poll();
        self.pending_status = None;
        self.pending_qr = None;
        self.transition(ConnectionState::Error { message });
        actions.push(AppAction::Render);
        actions
    }

    fn stop_poll(&mut self) -> Vec<AppAction> {
        if self.polling {
            self.polling = false;
            vec![AppAction::StopPolling]
        } else {
            vec![]
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::info!(from = self.state.name(), to = next.name(), "connection state");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted() -> (ConnectionFlow, UiContext, RequestId) {
        let mut flow = ConnectionFlow::new(DEFAULT_POLL_INTERVAL);
        let mut ctx = UiContext::default();
        let actions = flow.mount(&mut ctx);
        let request = request_of(&actions);
        (flow, ctx, request)
    }

    fn request_of(actions: &[AppAction]) -> RequestId {
        actions
            .iter()
            .find_map(|a| match a {
                AppAction::Request { request, .. } => Some(*request),
                _ => None,
            })
            .unwrap()
    }

    fn status(logged_in: bool) -> Result<ApiReply, String> {
        Ok(ApiReply::Status { logged_in })
    }

    fn qr() -> Result<ApiReply, String> {
        Ok(ApiReply::Qr(QrPayload::Raw("2@ref".into())))
    }

    /// Mount logged out and deliver the QR code.
    fn displaying() -> (ConnectionFlow, UiContext) {
        let (mut flow, mut ctx, first) = mounted();
        let actions = flow.handle_response(&mut ctx, first, status(false));
        let qr_request = request_of(&actions);
        flow.handle_response(&mut ctx, qr_request, qr());
        (flow, ctx)
    }

    #[test]
    fn mount_checks_status() {
        let (flow, _, _) = mounted();
        assert_eq!(flow.state(), &ConnectionState::Initializing);
        assert!(flow.is_busy());
    }

    #[test]
    fn logged_in_on_mount_goes_straight_to_connected() {
        let (mut flow, mut ctx, first) = mounted();
        let actions = flow.handle_response(&mut ctx, first, status(true));

        assert_eq!(flow.state(), &ConnectionState::Connected);
        assert_eq!(actions, vec![AppAction::Render]);
    }

    #[test]
    fn logged_out_on_mount_requests_qr() {
        let (mut flow, mut ctx, first) = mounted();
        let actions = flow.handle_response(&mut ctx, first, status(false));

        assert_eq!(flow.state(), &ConnectionState::LoadingQr);
        assert!(matches!(actions.as_slice(), [
            AppAction::Request { call: ApiCall::Connect { disconnect_first: false }, .. },
            AppAction::Render
        ]));
    }

    #[test]
    fn qr_starts_exactly_one_timer() {
        let (flow, _) = displaying();
        assert!(flow.state().is_displaying_qr());
        assert!(flow.is_polling());
    }

    #[test]
    fn poll_logged_in_stops_timer_and_connects() {
        let (mut flow, mut ctx) = displaying();
        let poll = request_of(&flow.poll_tick(&mut ctx));
        let actions = flow.handle_response(&mut ctx, poll, status(true));

        assert_eq!(flow.state(), &ConnectionState::Connected);
        assert_eq!(actions, vec![AppAction::StopPolling, AppAction::Render]);
        assert!(!flow.is_polling());
    }

    #[test]
    fn poll_logged_out_keeps_polling() {
        let (mut flow, mut ctx) = displaying();
        let poll = request_of(&flow.poll_tick(&mut ctx));
        let actions = flow.handle_response(&mut ctx, poll, status(false));

        assert!(actions.is_empty());
        assert!(flow.state().is_displaying_qr());
        assert!(flow.is_polling());
    }

    #[test]
    fn overlapping_poll_ticks_issue_one_request() {
        let (mut flow, mut ctx) = displaying();
        assert_eq!(flow.poll_tick(&mut ctx).len(), 1);
        assert!(flow.poll_tick(&mut ctx).is_empty());
    }

    #[test]
    fn poll_failure_stops_timer_and_errors() {
        let (mut flow, mut ctx) = displaying();
        let poll = request_of(&flow.poll_tick(&mut ctx));
        let actions = flow.handle_response(&mut ctx, poll, Err("offline".into()));

        assert_eq!(flow.state(), &ConnectionState::Error { message: "offline".into() });
        assert_eq!(actions, vec![AppAction::StopPolling, AppAction::Render]);
    }

    #[test]
    fn retry_from_error_reloads_qr() {
        let (mut flow, mut ctx, first) = mounted();
        flow.handle_response(&mut ctx, first, Err("offline".into()));

        let actions = flow.reconnect(&mut ctx);
        assert_eq!(flow.state(), &ConnectionState::LoadingQr);
        assert!(matches!(actions.first(), Some(AppAction::Request {
            call: ApiCall::Connect { disconnect_first: false },
            ..
        })));
    }

    #[test]
    fn regenerate_replaces_timer_without_overlap() {
        let (mut flow, mut ctx) = displaying();
        let actions = flow.reconnect(&mut ctx);

        assert_eq!(actions.first(), Some(&AppAction::StopPolling));
        assert!(!flow.is_polling());

        let qr_request = request_of(&actions);
        let actions = flow.handle_response(&mut ctx, qr_request, qr());
        assert!(matches!(actions.as_slice(), [AppAction::StartPolling { .. }, AppAction::Render]));
    }

    #[test]
    fn reconnect_from_connected_disconnects_first() {
        let (mut flow, mut ctx, first) = mounted();
        flow.handle_response(&mut ctx, first, status(true));

        let actions = flow.reconnect(&mut ctx);
        assert!(matches!(actions.first(), Some(AppAction::Request {
            call: ApiCall::Connect { disconnect_first: true },
            ..
        })));
    }

    #[test]
    fn reconnect_ignored_while_qr_loads() {
        let (mut flow, mut ctx, first) = mounted();
        flow.handle_response(&mut ctx, first, status(false));
        assert!(flow.reconnect(&mut ctx).is_empty());
    }

    #[test]
    fn test_connection_reports_connected() {
        let (mut flow, mut ctx, first) = mounted();
        flow.handle_response(&mut ctx, first, status(true));

        let test = request_of(&flow.test_connection(&mut ctx));
        flow.handle_response(&mut ctx, test, status(true));

        assert_eq!(flow.state(), &ConnectionState::Connected);
        assert_eq!(ctx.notice(), Some(&Notice::info("WhatsApp connected")));
    }

    #[test]
    fn test_connection_logged_out_returns_to_qr() {
        let (mut flow, mut ctx, first) = mounted();
        flow.handle_response(&mut ctx, first, status(true));

        let test = request_of(&flow.test_connection(&mut ctx));
        flow.handle_response(&mut ctx, test, status(false));

        assert_eq!(flow.state(), &ConnectionState::LoadingQr);
        assert_eq!(ctx.notice(), Some(&Notice::error("WhatsApp disconnected")));
    }

    #[test]
    fn unmount_stops_timer_and_drops_pending() {
        let (mut flow, mut ctx) = displaying();
        let poll = request_of(&flow.poll_tick(&mut ctx));

        assert_eq!(flow.unmount(), vec![AppAction::StopPolling]);
        assert!(!flow.owns(poll));
        assert!(flow.poll_tick(&mut ctx).is_empty());
    }

    #[test]
    fn superseded_poll_response_is_dropped() {
        let (mut flow, mut ctx) = displaying();
        let poll = request_of(&flow.poll_tick(&mut ctx));
        flow.reconnect(&mut ctx);

        let actions = flow.handle_response(&mut ctx, poll, status(true));
        assert!(actions.is_empty());
        assert_eq!(flow.state(), &ConnectionState::LoadingQr);
    }
}
