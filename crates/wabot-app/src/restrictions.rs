//! Restriction list and edit modal.
//!
//! The list is a cache of the backend table: loaded on mount, patched locally
//! from each successful update, never refetched after a mutation.

use wabot_api::{Restriction, RestrictionId, RestrictionPatch, RestrictionValue};

use crate::{
    ApiCall, ApiReply, AppAction, KeyInput, LoadState, RequestId, TextInput, state::UiContext,
};

/// Title of the row shown as a highlighted card above the others.
pub const MAIN_PROMPT: &str = "mainPrompt";

/// The only numeric row that accepts fractional values.
const RESPONSE_DELAY: &str = "responseDelay";

/// Display name for a restriction title. Unknown titles are shown as-is.
pub fn friendly_name(title: &str) -> &str {
    match title {
        MAIN_PROMPT => "Main AI prompt (restrictions)",
        "historyLimit" => "History limit (messages)",
        "transferPhrase" => "Default transfer phrase",
        "dbCleanupDays" => "Days before database cleanup",
        RESPONSE_DELAY => "Response delay (seconds)",
        other => other,
    }
}

/// Input kind of a restriction, taken from its value variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text, may span lines.
    Text,
    /// Number.
    Numeric {
        /// Whether non-integer values are accepted.
        fractional: bool,
    },
}

impl ValueKind {
    fn of(restriction: &Restriction) -> Self {
        match restriction.value {
            RestrictionValue::Text(_) => Self::Text,
            RestrictionValue::Numeric(_) => {
                Self::Numeric { fractional: restriction.title == RESPONSE_DELAY }
            },
        }
    }
}

/// Edit modal bound to one restriction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictionModal {
    /// Row being edited.
    pub id: RestrictionId,
    /// Row title.
    pub title: String,
    /// Input kind.
    pub kind: ValueKind,
    /// Draft value.
    pub input: TextInput,
    /// Inline validation or request error.
    pub error: Option<String>,
}

impl RestrictionModal {
    fn open(restriction: &Restriction) -> Self {
        let draft = match &restriction.value {
            RestrictionValue::Text(text) => text.clone(),
            RestrictionValue::Numeric(n) => n.to_string(),
        };
        Self {
            id: restriction.id,
            title: restriction.title.clone(),
            kind: ValueKind::of(restriction),
            input: TextInput::with_text(draft),
            error: None,
        }
    }

    /// Turn the draft into a patch of the row's own kind.
    fn patch(&self) -> Result<RestrictionPatch, String> {
        let ValueKind::Numeric { fractional } = self.kind else {
            return Ok(RestrictionPatch::text(self.input.text()));
        };

        let raw = self.input.text().trim();
        if raw.is_empty() {
            return Err("A value is required".into());
        }
        let value: f64 = raw.parse().map_err(|_| format!("'{raw}' is not a number"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("'{raw}' is not a valid value"));
        }
        if !fractional && value.fract() != 0.0 {
            return Err(format!("{} must be a whole number", friendly_name(&self.title)));
        }
        Ok(RestrictionPatch::numeric(value))
    }
}

/// Restrictions screen state machine.
#[derive(Debug, Clone)]
pub struct RestrictionEditor {
    rows: Vec<Restriction>,
    load: LoadState,
    pending_load: Option<RequestId>,
    pending_update: Option<RequestId>,
    /// Index into [`Self::display_order`].
    selected: usize,
    modal: Option<RestrictionModal>,
    /// Update failure reported after its modal closed.
    error: Option<String>,
}

impl Default for RestrictionEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl RestrictionEditor {
    /// Create an unmounted editor.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            load: LoadState::Idle,
            pending_load: None,
            pending_update: None,
            selected: 0,
            modal: None,
            error: None,
        }
    }

    /// Cached rows in backend order.
    pub fn rows(&self) -> &[Restriction] {
        &self.rows
    }

    /// Rows in display order: the main prompt first, then the rest in
    /// backend order.
    pub fn display_order(&self) -> Vec<&Restriction> {
        let (main, rest): (Vec<_>, Vec<_>) =
            self.rows.iter().partition(|r| r.title == MAIN_PROMPT);
        main.into_iter().chain(rest).collect()
    }

    /// List load progress.
    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Selected index into [`Self::display_order`].
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Open modal, if any.
    pub fn modal(&self) -> Option<&RestrictionModal> {
        self.modal.as_ref()
    }

    /// Whether an update is in flight.
    pub fn is_updating(&self) -> bool {
        self.pending_update.is_some()
    }

    /// Last update failure not shown in a modal.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `request` is a response this editor is waiting for.
    pub fn owns(&self, request: RequestId) -> bool {
        self.pending_load == Some(request) || self.pending_update == Some(request)
    }

    pub(crate) fn mount(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        let request = ctx.next_request();
        self.pending_load = Some(request);
        self.load = LoadState::Loading;
        self.error = None;
        vec![AppAction::Request { request, call: ApiCall::ListRestrictions }, AppAction::Render]
    }

    /// Leave the screen. In-flight responses still refresh the cache.
    pub(crate) fn unmount(&mut self) {
        self.modal = None;
    }

    pub(crate) fn select_next(&mut self) -> Vec<AppAction> {
        if self.modal.is_none() && self.selected + 1 < self.rows.len() {
            self.selected += 1;
        }
        vec![AppAction::Render]
    }

    pub(crate) fn select_prev(&mut self) -> Vec<AppAction> {
        if self.modal.is_none() {
            self.selected = self.selected.saturating_sub(1);
        }
        vec![AppAction::Render]
    }

    /// Open the modal for the selected row.
    pub(crate) fn edit_selected(&mut self) -> Vec<AppAction> {
        let id = self.display_order().get(self.selected).map(|r| r.id);
        id.map_or_else(Vec::new, |id| self.edit(id))
    }

    /// Open the modal for row `id`. Disabled while an update is in flight.
    pub(crate) fn edit(&mut self, id: RestrictionId) -> Vec<AppAction> {
        if self.is_updating() {
            return vec![];
        }
        let Some(position) = self.display_order().iter().position(|r| r.id == id) else {
            return vec![];
        };
        let modal = RestrictionModal::open(self.display_order()[position]);
        self.selected = position;
        self.modal = Some(modal);
        self.error = None;
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

    pub(crate) fn handle_modal_key(&mut self, ctx: &mut UiContext, key: KeyInput) -> Vec<AppAction> {
        let Some(kind) = self.modal.as_ref().map(|m| m.kind) else {
            return vec![];
        };
        match key {
            KeyInput::Esc => self.cancel(),
            KeyInput::Save => self.submit(ctx),
            KeyInput::Enter if kind != ValueKind::Text => self.submit(ctx),
            _ if self.is_updating() => vec![],
            key => {
                let multiline = kind == ValueKind::Text;
                let consumed =
                    self.modal.as_mut().is_some_and(|m| m.input.handle_key(key, multiline));
                if consumed { vec![AppAction::Render] } else { vec![] }
            },
        }
    }

    /// Close the modal without saving. Disabled while an update is in flight.
    pub(crate) fn cancel(&mut self) -> Vec<AppAction> {
        if self.is_updating() || self.modal.is_none() {
            return vec![];
        }
        self.modal = None;
        vec![AppAction::Render]
    }

    /// Send the draft as a partial update of the bound row.
    pub(crate) fn submit(&mut self, ctx: &mut UiContext) -> Vec<AppAction> {
        if self.is_updating() {
            return vec![];
        }
        let Some(modal) = self.modal.as_mut() else {
            return vec![];
        };

        match modal.patch() {
            Ok(patch) => {
                modal.error = None;
                let request = ctx.next_request();
                self.pending_update = Some(request);
                vec![
                    AppAction::Request {
                        request,
                        call: ApiCall::UpdateRestriction { id: modal.id, patch },
                    },
                    AppAction::Render,
                ]
            },
            Err(message) => {
                modal.error = Some(message);
                vec![AppAction::Render]
            },
        }
    }

    /// Apply a response. The caller checks [`Self::owns`] first.
    pub(crate) fn handle_response(
        &mut self,
        request: RequestId,
        response: Result<ApiReply, String>,
    ) -> Vec<AppAction> {
        if self.pending_load == Some(request) {
            self.pending_load = None;
            match response {
                Ok(ApiReply::Restrictions(rows)) => self.loaded(rows),
                Ok(other) => self.load = LoadState::Failed(format!("unexpected reply: {other:?}")),
                Err(message) => {
                    tracing::warn!(error = %message, "failed to load restrictions");
                    self.load = LoadState::Failed(message);
                },
            }
            return vec![AppAction::Render];
        }

        if self.pending_update == Some(request) {
            self.pending_update = None;
            match response {
                Ok(ApiReply::RestrictionUpdated(row)) => self.updated(row),
                Ok(other) => self.update_failed(format!("unexpected reply: {other:?}")),
                Err(message) => self.update_failed(message),
            }
            return vec![AppAction::Render];
        }

        tracing::debug!(%request, "dropping stale restriction response");
        vec![]
    }

    fn loaded(&mut self, rows: Vec<Restriction>) {
        tracing::info!(count = rows.len(), "restrictions loaded");
        self.rows = rows;
        self.load = LoadState::Loaded;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        if self.modal.as_ref().is_some_and(|m| !self.rows.iter().any(|r| r.id == m.id)) {
            self.modal = None;
        }
    }

    fn updated(&mut self, row: Restriction) {
        tracing::info!(id = row.id, title = %row.title, "restriction updated");
        if self.modal.as_ref().is_some_and(|m| m.id == row.id) {
            self.modal = None;
        }
        if let Some(slot) = self.rows.iter_mut().find(|r| r.id == row.id) {
            *slot = row;
        }
    }

    fn update_failed(&mut self, message: String) {
        tracing::warn!(error = %message, "failed to update restriction");
        match self.modal.as_mut() {
            Some(modal) => modal.error = Some(message),
            None => self.error = Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: RestrictionId, title: &str, value: RestrictionValue) -> Restriction {
        Restriction { id, title: title.into(), value }
    }

    fn sample() -> Vec<Restriction> {
        vec![
            row(2, "historyLimit", RestrictionValue::Numeric(20.0)),
            row(1, MAIN_PROMPT, RestrictionValue::Text("Be polite".into())),
            row(3, RESPONSE_DELAY, RestrictionValue::Numeric(1.5)),
        ]
    }

    fn loaded() -> (RestrictionEditor, UiContext) {
        let mut editor = RestrictionEditor::new();
        let mut ctx = UiContext::default();
        let actions = editor.mount(&mut ctx);
        let AppAction::Request { request, .. } = actions[0].clone() else {
            panic!("expected list request");
        };
        editor.handle_response(request, Ok(ApiReply::Restrictions(sample())));
        (editor, ctx)
    }

    fn submitted_call(actions: &[AppAction]) -> (RequestId, ApiCall) {
        match &actions[0] {
            AppAction::Request { request, call } => (*request, call.clone()),
            other => panic!("expected request, got {other:?}"),
        }
    }

    #[test]
    fn main_prompt_is_listed_first() {
        let (editor, _) = loaded();
        let titles: Vec<_> = editor.display_order().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec![MAIN_PROMPT, "historyLimit", RESPONSE_DELAY]);
    }

    #[test]
    fn friendly_names_fall_back_to_title() {
        assert_eq!(friendly_name("historyLimit"), "History limit (messages)");
        assert_eq!(friendly_name("somethingNew"), "somethingNew");
    }

    #[test]
    fn numeric_draft_is_formatted_number() {
        let (mut editor, _) = loaded();
        editor.edit(2);
        assert_eq!(editor.modal().unwrap().input.text(), "20");
        assert_eq!(editor.modal().unwrap().kind, ValueKind::Numeric { fractional: false });
    }

    #[test]
    fn text_submit_sends_text_patch_only() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(1);
        editor.set_draft("X");

        let (_, call) = submitted_call(&editor.submit(&mut ctx));
        assert_eq!(call, ApiCall::UpdateRestriction { id: 1, patch: RestrictionPatch::text("X") });
    }

    #[test]
    fn fractional_value_accepted_for_response_delay() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(3);
        editor.set_draft("2.5");

        let (_, call) = submitted_call(&editor.submit(&mut ctx));
        assert_eq!(call, ApiCall::UpdateRestriction {
            id: 3,
            patch: RestrictionPatch::numeric(2.5)
        });
    }

    #[test]
    fn invalid_number_sends_nothing() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(2);

        for draft in ["abc", "", "2.5", "-1"] {
            editor.set_draft(draft);
            let actions = editor.submit(&mut ctx);
            assert_eq!(actions, vec![AppAction::Render], "draft {draft:?}");
            assert!(editor.modal().unwrap().error.is_some());
        }
        assert!(!editor.is_updating());
    }

    #[test]
    fn success_replaces_row_and_closes_modal() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(2);
        editor.set_draft("30");
        let (request, _) = submitted_call(&editor.submit(&mut ctx));

        let updated = row(2, "historyLimit", RestrictionValue::Numeric(30.0));
        editor.handle_response(request, Ok(ApiReply::RestrictionUpdated(updated.clone())));

        assert!(editor.modal().is_none());
        assert_eq!(editor.rows()[0], updated);
        assert_eq!(editor.rows().len(), 3);
    }

    #[test]
    fn failure_keeps_modal_open_with_error() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(1);
        let (request, _) = submitted_call(&editor.submit(&mut ctx));

        editor.handle_response(request, Err("server returned 500: boom".into()));

        let modal = editor.modal().unwrap();
        assert_eq!(modal.error.as_deref(), Some("server returned 500: boom"));
        assert!(!editor.is_updating());
    }

    #[test]
    fn submit_disabled_while_updating() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(1);
        assert_eq!(editor.submit(&mut ctx).len(), 2);
        assert!(editor.submit(&mut ctx).is_empty());
        assert!(editor.cancel().is_empty());
    }

    #[test]
    fn enter_adds_newline_to_text_but_submits_numbers() {
        let (mut editor, mut ctx) = loaded();
        editor.edit(1);
        editor.handle_modal_key(&mut ctx, KeyInput::Enter);
        assert_eq!(editor.modal().unwrap().input.text(), "Be polite\n");
        editor.cancel();

        editor.edit(2);
        let actions = editor.handle_modal_key(&mut ctx, KeyInput::Enter);
        assert!(matches!(actions.first(), Some(AppAction::Request { .. })));
    }

    #[test]
    fn load_failure_is_reported() {
        let mut editor = RestrictionEditor::new();
        let mut ctx = UiContext::default();
        let (request, _) = submitted_call(&editor.mount(&mut ctx));

        editor.handle_response(request, Err("request failed".into()));
        assert_eq!(editor.load_state(), &LoadState::Failed("request failed".into()));
    }
}
