//! Default message list, edit modal and delete confirmation.
//!
//! Mutations are applied locally from the returned rows: create appends,
//! update replaces by id, delete removes by id. Other rows keep their order
//! and nothing is refetched.

use wabot_api::{DefaultMessage, MessageId};

use crate::{
    ApiCall, ApiReply, AppAction, KeyInput, LoadState, Notice, RequestId, TextInput,
    state::UiContext,
};

/// What saving the modal does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageModalMode {
    /// Create a new message.
    Create,
    /// Replace the text of an existing message.
    Edit(MessageId),
}

/// Create or edit modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageModal {
    /// Create or edit.
    pub mode: MessageModalMode,
    /// Draft text.
    pub input: TextInput,
    /// Inline request error.
    pub error: Option<String>,
}

/// Default messages screen state machine.
#[derive(Debug, Clone)]
pub struct MessageEditor {
    messages: Vec<DefaultMessage>,
    load: LoadState,
    pending_load: Option<RequestId>,
    pending_save: Option<(RequestId, MessageModalMode)>,
    pending_delete: Option<(RequestId, MessageId)>,
    selected: usize,
    modal: Option<MessageModal>,
    /// Message awaiting delete confirmation.
    confirm_delete: Option<MessageId>,
    /// Save failure reported after its modal closed.
    error: Option<String>,
}

impl Default for MessageEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageEditor {
    /// Create an unmounted editor.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            load: LoadState::Idle,
            pending_load: None,
            pending_save: None,
            pending_delete: None,
            selected: 0,
            modal: None,
            confirm_delete: None,
            error: None,
        }
    }

    /// Cached messages in display order.
    pub fn messages(&self) -> &[DefaultMessage] {
        &self.messages
    }

    /// List load progress.
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Selected row index.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Open modal, if any.
    pub fn modal(&self) -> Option<&MessageModal> {
        self.modal.as_ref()
    }

    /// Message awaiting delete confirmation, if any.
    pub fn confirming_delete(&self) -> Option<&DefaultMessage> {
        let id = self.confirm_delete?;
        self.messages.iter().find(|m| m.id == id)
    }

    /// Whether a save or delete is in flight.
    pub fn is_processing(&self) -> bool {
        self.pending_save.is_some() || self.pending_delete.is_some()
    }

    /// Last save failure not shown in a modal.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `request` is a response this editor is waiting for.
    pub fn owns(&self, request: RequestId) -> bool {
        self.pending_load == Some(request)
            || self.pending_save.is_some_and(|(id, _)| id == request)
            || self.pending_delete.is_some_and(|(id, _)| id == request)
    }

    pub(crate) fn mount(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        let request = ctx.next_request();
        self.pending_load = Some(request);
        self.load = LoadState::Loading;
        self.error = None;
        vec![AppAction::Request { request, call: ApiCall::ListMessages }, AppAction::Render]
    }

    /// Leave the screen. In-flight responses still update the cache.
    pub(crate) fn unmount(&mut self) {
        self.modal = None;
        self.confirm_delete = None;
    }

    /// Whether the modal or the delete confirmation captures keys.
    pub(crate) fn is_capturing(&self) -> bool {
        self.modal.is_some() || self.confirm_delete.is_some()
    }

    pub(crate) fn select_next(&mut self) -> Vec<AppAction> {
        if self.selected + 1 < self.messages.len() {
            self.selected += 1;
        }
        vec![AppAction::Render]
    }

    pub(crate) fn select_prev(&mut self) -> Vec<AppAction> {
        self.selected = self.selected.saturating_sub(1);
        vec![AppAction::Render]
    }

    /// Open an empty create modal.
    pub(crate) fn add(&mut self) -> Vec<AppAction> {
        self.open(MessageModalMode::Create, TextInput::new())
    }

    /// Open the edit modal for the selected message.
    pub(crate) fn edit_selected(&mut self) -> Vec<AppAction> {
        let id = self.messages.get(self.selected).map(|m| m.id);
        id.map_or_else(Vec::new, |id| self.edit(id))
    }

    /// Open the edit modal for message `id`.
    pub(crate) fn edit(&mut self, id: MessageId) -> Vec<AppAction> {
        let Some(position) = self.messages.iter().position(|m| m.id == id) else {
            return vec![];
        };
        self.selected = position;
        let input = TextInput::with_text(self.messages[position].text.clone());
        self.open(MessageModalMode::Edit(id), input)
    }

    fn open(&mut self, mode: MessageModalMode, input: TextInput) -> Vec<AppAction> {
        if self.pending_save.is_some() {
            return vec![];
        }
        self.confirm_delete = None;
        self.error = None;
        self.modal = Some(MessageModal { mode, input, error: None });
        vec![AppAction::Render]
    }

    /// Replace the draft text of the open modal.
    pub(crate) fn set_draft(&mut self, text: &str) -> Vec<AppAction> {
        match self.modal.as_mut() {
            Some(modal) => {
                modal.input.set(text);
                vec![AppAction::Render]
            },
            None => vec![],
        }
    }

    pub(crate) fn handle_key(&mut self, ctx: &mut UiContext, key: KeyInput) -> Vec<AppAction> {
        if self.confirm_delete.is_some() {
            return match key {
                KeyInput::Char('y' | 'Y') | KeyInput::Enter => self.confirm(ctx, true),
                KeyInput::Char('n' | 'N') | KeyInput::Esc => self.confirm(ctx, false),
                _ => vec![],
            };
        }

        match key {
            KeyInput::Esc => self.cancel(),
            KeyInput::Save => self.save(ctx),
            _ if self.pending_save.is_some() => vec![],
            key => {
                let consumed = self.modal.as_mut().is_some_and(|m| m.input.handle_key(key, true));
                if consumed { vec![AppAction::Render] } else { vec![] }
            },
        }
    }

    /// Close the modal without saving.
    pub(crate) fn cancel(&mut self) -> Vec<AppAction> {
        if self.pending_save.is_some() || self.modal.take().is_none() {
            return vec![];
        }
        vec![AppAction::Render]
    }

    /// Save the draft. Blank drafts are ignored.
    pub(crate) fn save(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        if self.pending_save.is_some() {
            return vec![];
        }
        let Some(modal) = self.modal.as_mut() else {
            return vec![];
        };
        if modal.input.is_blank() {
            return vec![];
        }

        let text = modal.input.text().to_string();
        let call = match modal.mode {
            MessageModalMode::Create => ApiCall::CreateMessage { text },
            MessageModalMode::Edit(id) => ApiCall::UpdateMessage { id, text },
        };
        modal.error = None;

        let request = ctx.next_request();
        self.pending_save = Some((request, modal.mode));
        vec![AppAction::Request { request, call }, AppAction::Render]
    }

    /// Ask for confirmation before deleting the selected message.
    pub(crate) fn request_delete_selected(&mut self) -> Vec<AppAction> {
        let id = self.messages.get(self.selected).map(|m| m.id);
        id.map_or_else(Vec::new, |id| self.request_delete(id))
    }

    /// Ask for confirmation before deleting message `id`.
    pub(crate) fn request_delete(&mut self, id: MessageId) -> Vec<AppAction> {
        if self.modal.is_some()
            || self.pending_delete.is_some()
            || !self.messages.iter().any(|m| m.id == id)
        {
            return vec![];
        }
        self.confirm_delete = Some(id);
        vec![AppAction::Render]
    }

    /// Answer the delete confirmation. Declining issues no request.
    pub(crate) fn confirm(&mut self, ctx: &mut UiContext, accept: bool) -> Vec<AppAction> {
        let Some(id) = self.confirm_delete.take() else {
            return vec![];
        };
        if !accept || self.pending_delete.is_some() {
            return vec![AppAction::Render];
        }

        let request = ctx.next_request();
        self.pending_delete = Some((request, id));
        vec![AppAction::Request { request, call: ApiCall::DeleteMessage { id } }, AppAction::Render]
    }

    /// Apply a response. The caller checks [`Self::owns`] first.
    pub(crate) fn handle_response(
        &mut self,
        ctx: &mut UiContext,
        request: RequestId,
        response: Result<ApiReply, String>,
    ) -> Vec<AppAction> {
        if self.pending_load == Some(request) {
            self.pending_load = None;
            match response {
                Ok(ApiReply::Messages(messages)) => self.loaded(messages),
                Ok(other) => self.load = LoadState::Failed(format!("unexpected reply: {other:?}")),
                Err(message) => {
                    tracing::warn!(error = %message, "failed to load default messages");
                    self.load = LoadState::Failed(message);
                },
            }
            return vec![AppAction::Render];
        }

        if let Some((_, mode)) = self.pending_save.take_if(|(id, _)| *id == request) {
            match response {
                Ok(ApiReply::MessageCreated(message) | ApiReply::MessageUpdated(message)) => {
                    self.saved(mode, message);
                },
                Ok(other) => self.save_failed(format!("unexpected reply: {other:?}")),
                Err(message) => self.save_failed(message),
            }
            return vec![AppAction::Render];
        }

        if let Some((_, id)) = self.pending_delete.take_if(|(pending, _)| *pending == request) {
            match response {
                Ok(_) => self.deleted(id),
                Err(message) => {
                    tracing::warn!(id, error = %message, "failed to delete default message");
                    ctx.notify(Notice::error(format!("Failed to delete message: {message}")));
                },
            }
            return vec![AppAction::Render];
        }

        tracing::debug!(%request, "dropping stale default message response");
        vec![]
    }

    fn loaded(&mut self, messages: Vec<DefaultMessage>) {
        tracing::info!(count = messages.len(), "default messages loaded");
        self.messages = messages;
        self.load = LoadState::Loaded;
        self.clamp_selection();
        let orphaned = matches!(
            &self.modal,
            Some(MessageModal { mode: MessageModalMode::Edit(id), .. })
                if !self.messages.iter().any(|m| m.id == *id)
        );
        if orphaned {
            self.modal = None;
        }
    }

    fn saved(&mut self, mode: MessageModalMode, message: DefaultMessage) {
        tracing::info!(id = message.id, ?mode, "default message saved");
        if self.modal.as_ref().is_some_and(|m| m.mode == mode) {
            self.modal = None;
        }
        let target = match mode {
            MessageModalMode::Create => message.id,
            MessageModalMode::Edit(id) => id,
        };
        match self.messages.iter_mut().find(|m| m.id == target) {
            Some(slot) => *slot = message,
            None if mode == MessageModalMode::Create => {
                self.messages.push(message);
                self.selected = self.messages.len() - 1;
            },
            None => {},
        }
    }

    fn save_failed(&mut self, message: String) {
        tracing::warn!(error = %message, "failed to save default message");
        let message = format!("Failed to save message: {message}");
        match self.modal.as_mut() {
            Some(modal) => modal.error = Some(message),
            None => self.error = Some(message),
        }
    }

    fn deleted(&mut self, id: MessageId) {
        tracing::info!(id, "default message deleted");
        self.messages.retain(|m| m.id != id);
        self.clamp_selection();
        if self.modal.as_ref().is_some_and(|m| m.mode == MessageModalMode::Edit(id)) {
            self.modal = None;
        }
        if self.confirm_delete == Some(id) {
            self.confirm_delete = None;
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.messages.len().saturating_sub(1));
    }
}
