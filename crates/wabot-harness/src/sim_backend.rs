//! In-memory backend implementing [`AdminApi`].
//!
//! Holds the session flag, restriction table and default messages the way the
//! real backend does, records every call with its method, path and JSON body,
//! and can be told to fail the next call to a given endpoint.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use serde_json::{Value, json};
use wabot_api::{
    AdminApi, ApiError, DefaultMessage, MessageId, QrPayload, Restriction, RestrictionId,
    RestrictionPatch, RestrictionValue, Result,
};

/// One backend endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET connect`
    Connect,
    /// `GET status`
    Status,
    /// `GET disconnect`
    Disconnect,
    /// `GET restriction`
    ListRestrictions,
    /// `PUT restriction/{id}`
    UpdateRestriction,
    /// `GET default_messages/`
    ListMessages,
    /// `POST default_messages/`
    CreateMessage,
    /// `PUT default_messages/{id}`
    UpdateMessage,
    /// `DELETE default_messages/{id}`
    DeleteMessage,
}

impl Endpoint {
    /// HTTP method the real client uses.
    pub fn method(self) -> &'static str {
        match self {
            Self::Connect
            | Self::Status
            | Self::Disconnect
            | Self::ListRestrictions
            | Self::ListMessages => "GET",
            Self::UpdateRestriction | Self::UpdateMessage => "PUT",
            Self::CreateMessage => "POST",
            Self::DeleteMessage => "DELETE",
        }
    }
}

/// A call observed by [`SimBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Endpoint hit.
    pub endpoint: Endpoint,
    /// HTTP method.
    pub method: &'static str,
    /// Path relative to the base URL.
    pub path: String,
    /// JSON body, for calls that send one.
    pub body: Option<Value>,
}

struct BackendState {
    logged_in: bool,
    /// Answers consumed by `status` before falling back to `logged_in`.
    status_script: VecDeque<bool>,
    qr_issued: u64,
    restrictions: Vec<Restriction>,
    messages: Vec<DefaultMessage>,
    failures: HashMap<Endpoint, VecDeque<String>>,
    calls: Vec<RecordedCall>,
}

/// In-memory [`AdminApi`]. Clones share state.
#[derive(Clone)]
pub struct SimBackend {
    state: Arc<Mutex<BackendState>>,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    /// Logged-out backend with empty tables.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                logged_in: false,
                status_script: VecDeque::new(),
                qr_issued: 0,
                restrictions: Vec::new(),
                messages: Vec::new(),
                failures: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }

    /// Start with the session logged in or out.
    #[must_use]
    pub fn logged_in(self, logged_in: bool) -> Self {
        self.set_logged_in(logged_in);
        self
    }

    /// Seed the restriction table.
    #[must_use]
    pub fn with_restrictions(self, rows: Vec<Restriction>) -> Self {
        self.lock().restrictions = rows;
        self
    }

    /// Seed the default messages.
    #[must_use]
    pub fn with_messages(self, messages: Vec<DefaultMessage>) -> Self {
        self.lock().messages = messages;
        self
    }

    /// Flip the session flag (e.g. the phone scanned the code).
    pub fn set_logged_in(&self, logged_in: bool) {
        self.lock().logged_in = logged_in;
    }

    /// Queue answers for the next `status` calls.
    pub fn script_status(&self, answers: impl IntoIterator<Item = bool>) {
        self.lock().status_script.extend(answers);
    }

    /// Fail the next call to `endpoint` with a 500 carrying `message`.
    pub fn fail_next(&self, endpoint: Endpoint, message: impl Into<String>) {
        self.lock().failures.entry(endpoint).or_default().push_back(message.into());
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Calls to one endpoint, in order.
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<RecordedCall> {
        self.lock().calls.iter().filter(|c| c.endpoint == endpoint).cloned().collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current restriction table.
    pub fn stored_restrictions(&self) -> Vec<Restriction> {
        self.lock().restrictions.clone()
    }

    /// Current default messages.
    pub fn stored_messages(&self) -> Vec<DefaultMessage> {
        self.lock().messages.clone()
    }

    /// Number of QR payloads handed out.
    pub fn qr_issued(&self) -> u64 {
        self.lock().qr_issued
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a call and apply any injected failure.
    fn record(
        state: &mut BackendState,
        endpoint: Endpoint,
        path: String,
        body: Option<Value>,
    ) -> Result<()> {
        tracing::trace!(?endpoint, %path, "sim backend call");
        state.calls.push(RecordedCall { endpoint, method: endpoint.method(), path, body });
        match state.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(body) => Err(ApiError::Status { status: 500, body }),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Status { status: 404, body: format!("{what} not found") }
}

#[async_trait]
impl AdminApi for SimBackend {
    async fn connect(&self) -> Result<QrPayload> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::Connect, "connect".into(), None)?;
        state.qr_issued += 1;
        Ok(QrPayload::Raw(format!("2@sim-pairing-{}", state.qr_issued)))
    }

    async fn status(&self) -> Result<bool> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::Status, "status".into(), None)?;
        let logged_in = state.logged_in;
        Ok(state.status_script.pop_front().unwrap_or(logged_in))
    }

    async fn disconnect(&self) -> Result<()> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::Disconnect, "disconnect".into(), None)?;
        state.logged_in = false;
        Ok(())
    }

    async fn restrictions(&self) -> Result<Vec<Restriction>> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::ListRestrictions, "restriction".into(), None)?;
        Ok(state.restrictions.clone())
    }

    async fn update_restriction(
        &self,
        id: RestrictionId,
        patch: &RestrictionPatch,
    ) -> Result<Restriction> {
        let mut state = self.lock();
        let body = serde_json::to_value(patch)?;
        Self::record(
            &mut state,
            Endpoint::UpdateRestriction,
            format!("restriction/{id}"),
            Some(body),
        )?;

        let row =
            state.restrictions.iter_mut().find(|r| r.id == id).ok_or_else(|| not_found("restriction"))?;
        match (&mut row.value, patch) {
            (RestrictionValue::Text(text), RestrictionPatch::Text { restriction }) => {
                text.clone_from(restriction);
            },
            (
                RestrictionValue::Numeric(number),
                RestrictionPatch::Numeric { restriction_number },
            ) => *number = *restriction_number,
            _ => {
                return Err(ApiError::Status {
                    status: 400,
                    body: format!("restriction {id}: value kind mismatch"),
                });
            },
        }
        Ok(row.clone())
    }

    async fn default_messages(&self) -> Result<Vec<DefaultMessage>> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::ListMessages, "default_messages/".into(), None)?;
        Ok(state.messages.clone())
    }

    async fn create_default_message(&self, text: &str) -> Result<DefaultMessage> {
        let mut state = self.lock();
        Self::record(
            &mut state,
            Endpoint::CreateMessage,
            "default_messages/".into(),
            Some(json!({ "message": text })),
        )?;
        let id: MessageId = state.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let message = DefaultMessage { id, text: text.to_string() };
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn update_default_message(&self, id: MessageId, text: &str) -> Result<DefaultMessage> {
        let mut state = self.lock();
        Self::record(
            &mut state,
            Endpoint::UpdateMessage,
            format!("default_messages/{id}"),
            Some(json!({ "message": text })),
        )?;
        let message =
            state.messages.iter_mut().find(|m| m.id == id).ok_or_else(|| not_found("message"))?;
        message.text = text.to_string();
        Ok(message.clone())
    }

    async fn delete_default_message(&self, id: MessageId) -> Result<()> {
        let mut state = self.lock();
        Self::record(&mut state, Endpoint::DeleteMessage, format!("default_messages/{id}"), None)?;
        let before = state.messages.len();
        state.messages.retain(|m| m.id != id);
        if state.messages.len() == before {
            return Err(not_found("message"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn status_script_runs_before_flag() {
        let backend = SimBackend::new().logged_in(true);
        backend.script_status([false]);

        assert!(!backend.status().await.unwrap());
        assert!(backend.status().await.unwrap());
        assert_eq!(backend.calls_to(Endpoint::Status).len(), 2);
    }

    #[tokio::test]
    async fn injected_failure_is_one_shot() {
        let backend = SimBackend::new();
        backend.fail_next(Endpoint::Connect, "boom");

        assert!(matches!(backend.connect().await, Err(ApiError::Status { status: 500, .. })));
        assert!(backend.connect().await.is_ok());
    }

    #[tokio::test]
    async fn update_records_patch_body() {
        let backend = SimBackend::new().with_restrictions(vec![Restriction {
            id: 1,
            title: "mainPrompt".into(),
            value: RestrictionValue::Text("old".into()),
        }]);

        backend.update_restriction(1, &RestrictionPatch::text("new")).await.unwrap();

        let call = &backend.calls()[0];
        assert_eq!(call.method, "PUT");
        assert_eq!(call.path, "restriction/1");
        assert_eq!(call.body, Some(json!({ "restriction": "new" })));
    }

    #[tokio::test]
    async fn mismatched_patch_is_rejected() {
        let backend = SimBackend::new().with_restrictions(vec![Restriction {
            id: 2,
            title: "historyLimit".into(),
            value: RestrictionValue::Numeric(20.0),
        }]);

        let result = backend.update_restriction(2, &RestrictionPatch::text("20")).await;
        assert!(matches!(result, Err(ApiError::Status { status: 400, .. })));
    }

    #[tokio::test]
    async fn created_ids_follow_the_highest() {
        let backend = SimBackend::new().with_messages(vec![DefaultMessage { id: 7, text: "a".into() }]);
        let created = backend.create_default_message("b").await.unwrap();
        assert_eq!(created.id, 8);
    }
}
