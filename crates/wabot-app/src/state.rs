//! Observable application state types.
//!
//! These are the "View Model" pieces the renderer reads: where the login flow
//! stands, whether a list has loaded, and the current notice popup.

use wabot_api::QrPayload;

use crate::{RequestId, RequestIds};

/// Login flow state shown on the connection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// First status check in flight.
    Initializing,
    /// QR payload requested.
    LoadingQr,
    /// QR code on screen; status is polled until the phone pairs.
    DisplayingQr {
        /// Payload to render.
        qr: QrPayload,
    },
    /// Session logged in.
    Connected,
    /// A status or QR call failed.
    Error {
        /// Failure description.
        message: String,
    },
}

impl ConnectionState {
    /// Short state name for logs and the status bar.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::LoadingQr => "loading_qr",
            Self::DisplayingQr { .. } => "displaying_qr",
            Self::Connected => "connected",
            Self::Error { .. } => "error",
        }
    }

    /// Whether a QR code is on screen.
    pub fn is_displaying_qr(&self) -> bool {
        matches!(self, Self::DisplayingQr { .. })
    }
}

/// Load progress of a backend-owned list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Never requested.
    Idle,
    /// List request in flight.
    Loading,
    /// Cache reflects the last successful list.
    Loaded,
    /// Last list request failed.
    Failed(String),
}

impl LoadState {
    /// Whether the list request is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational.
    Info,
    /// Something failed.
    Error,
}

/// Blocking popup. Any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

/// State shared by every screen: the request id allocator and the notice slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct UiContext {
    requests: RequestIds,
    notice: Option<Notice>,
}

impl UiContext {
    pub(crate) fn next_request(&mut self) -> RequestId {
        self.requests.allocate()
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        tracing::info!(kind = ?notice.kind, message = %notice.message, "notice");
        self.notice = Some(notice);
    }

    pub(crate) fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub(crate) fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }
}
