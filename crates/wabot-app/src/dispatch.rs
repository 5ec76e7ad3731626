//! Tokio plumbing shared by real drivers.
//!
//! [`Dispatcher`] runs backend calls as spawned tasks and feeds their results
//! back into the event channel. [`PollTimer`] owns the single status poll
//! task.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use wabot_api::AdminApi;

use crate::{ApiCall, ApiReply, AppEvent, RequestId};

/// Perform one backend call.
///
/// A reconnect's disconnect step is best effort: its failure is logged and
/// the QR fetch goes ahead.
pub async fn execute(api: &dyn AdminApi, call: ApiCall) -> wabot_api::Result<ApiReply> {
    match call {
        ApiCall::Status => api.status().await.map(|logged_in| ApiReply::Status { logged_in }),
        ApiCall::Connect { disconnect_first } => {
            if disconnect_first && let Err(e) = api.disconnect().await {
                tracing::warn!(error = %e, "disconnect failed, requesting a new QR code anyway");
            }
            api.connect().await.map(ApiReply::Qr)
        },
        ApiCall::ListRestrictions => api.restrictions().await.map(ApiReply::Restrictions),
        ApiCall::UpdateRestriction { id, patch } => {
            api.update_restriction(id, &patch).await.map(ApiReply::RestrictionUpdated)
        },
        ApiCall::ListMessages => api.default_messages().await.map(ApiReply::Messages),
        ApiCall::CreateMessage { text } => {
            api.create_default_message(&text).await.map(ApiReply::MessageCreated)
        },
        ApiCall::UpdateMessage { id, text } => {
            api.update_default_message(id, &text).await.map(ApiReply::MessageUpdated)
        },
        ApiCall::DeleteMessage { id } => {
            api.delete_default_message(id).await.map(|()| ApiReply::MessageDeleted)
        },
    }
}

/// Runs [`ApiCall`]s on tokio and reports completions as [`AppEvent::Api`].
///
/// Calls are never cancelled. A completion nobody waits for any more is
/// dropped by the state machines.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn AdminApi>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl Dispatcher {
    /// Create a dispatcher reporting into `events`.
    pub fn new(api: Arc<dyn AdminApi>, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { api, events }
    }

    /// Spawn `call`. Must be called from within a tokio runtime.
    pub fn dispatch(&self, request: RequestId, call: ApiCall) {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        tokio::spawn(async move {
            let label = call.label();
            let response = execute(api.as_ref(), call).await.map_err(|e| {
                tracing::warn!(%request, call = label, error = %e, "backend call failed");
                e.to_string()
            });
            if events.send(AppEvent::Api { request, response }).is_err() {
                tracing::debug!(%request, "event loop gone, dropping response");
            }
        });
    }
}

/// Shortest status poll period a [`PollTimer`] runs at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Owns at most one task emitting [`AppEvent::PollTick`].
///
/// Starting aborts the previous task first, and dropping the timer aborts the
/// task, so two timers are never alive at once.
pub struct PollTimer {
    events: mpsc::UnboundedSender<AppEvent>,
    task: Option<JoinHandle<()>>,
}

impl PollTimer {
    /// Create a stopped timer reporting into `events`.
    pub fn new(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { events, task: None }
    }

    /// Emit a tick every `every`, first one after a full period.
    ///
    /// Periods shorter than [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn start(&mut self, every: Duration) {
        self.stop();
        let every = if every < MIN_POLL_INTERVAL {
            tracing::warn!(
                ?every,
                floor = ?MIN_POLL_INTERVAL,
                "poll period too short, raising it"
            );
            MIN_POLL_INTERVAL
        } else {
            every
        };
        let events = self.events.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(AppEvent::PollTick).is_err() {
                    break;
                }
            }
        }));
        tracing::debug!(?every, "poll timer started");
    }

    /// Abort the running task, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("poll timer stopped");
        }
    }

    /// Whether a timer task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
