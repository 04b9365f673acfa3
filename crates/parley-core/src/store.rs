//! Conversation store
//!
//! Every mutation is an [`Action`] applied through the pure [`reduce`]
//! transition. [`Store`] owns the current [`AppState`] and is the only thing
//! front ends talk to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::state::{ChatMessage, Conversation};

pub const DEFAULT_MODEL: &str = "GPT-4";

/// Conversations (most recently created first), the active id and the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: Option<String>,
    pub selected_model: String,
}

impl AppState {
    /// An empty state with nothing active.
    pub fn new(selected_model: impl Into<String>) -> Self {
        Self {
            conversations: Vec::new(),
            active_conversation_id: None,
            selected_model: selected_model.into(),
        }
    }

    /// Startup state: a single empty conversation, already active.
    pub fn initial(selected_model: impl Into<String>) -> Self {
        let conversation = Conversation::new();
        Self {
            active_conversation_id: Some(conversation.id.clone()),
            conversations: vec![conversation],
            selected_model: selected_model.into(),
        }
    }

    /// The active conversation, if the active id resolves to one.
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_conversation_id
            .as_deref()
            .and_then(|id| self.conversation(id))
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateConversation(Conversation),
    SelectConversation(String),
    UpdateConversation {
        id: String,
        messages: Vec<ChatMessage>,
        at: DateTime<Utc>,
    },
    DeleteConversation(String),
    SetSelectedModel(String),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::CreateConversation(_) => "create_conversation",
            Action::SelectConversation(_) => "select_conversation",
            Action::UpdateConversation { .. } => "update_conversation",
            Action::DeleteConversation(_) => "delete_conversation",
            Action::SetSelectedModel(_) => "set_selected_model",
        }
    }

    /// The conversation this action requires to exist, if any.
    fn required_conversation(&self) -> Option<&str> {
        match self {
            Action::UpdateConversation { id, .. } | Action::DeleteConversation(id) => Some(id),
            _ => None,
        }
    }
}

/// Apply one action. Total: unknown ids leave the state untouched.
pub fn reduce(mut state: AppState, action: Action) -> AppState {
    match action {
        Action::CreateConversation(conversation) => {
            state.active_conversation_id = Some(conversation.id.clone());
            state.conversations.insert(0, conversation);
        }
        Action::SelectConversation(id) => {
            state.active_conversation_id = Some(id);
        }
        Action::UpdateConversation { id, messages, at } => {
            if let Some(conversation) = state.conversations.iter_mut().find(|c| c.id == id) {
                conversation.replace_messages(messages, at);
            }
        }
        Action::DeleteConversation(id) => {
            let before = state.conversations.len();
            state.conversations.retain(|c| c.id != id);
            let removed = state.conversations.len() != before;

            if removed && state.active_conversation_id.as_deref() == Some(id.as_str()) {
                state.active_conversation_id = state.conversations.first().map(|c| c.id.clone());
            }
        }
        Action::SetSelectedModel(name) => {
            state.selected_model = name;
        }
    }
    state
}

pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.state.conversations
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.state.conversation(id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.state.active_conversation()
    }

    pub fn active_conversation_id(&self) -> Option<&str> {
        self.state.active_conversation_id.as_deref()
    }

    pub fn selected_model(&self) -> &str {
        &self.state.selected_model
    }

    /// Run `action` through [`reduce`].
    ///
    /// Updates and deletes aimed at an unknown conversation leave the state
    /// as it was and report [`ChatError::ConversationNotFound`].
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let name = action.name();
        if let Some(id) = action.required_conversation() {
            if self.state.conversation(id).is_none() {
                tracing::debug!(action = name, conversation_id = id, "ignoring action for unknown conversation");
                return Err(ChatError::ConversationNotFound(id.to_string()));
            }
        }

        self.apply(action);
        Ok(())
    }

    /// Reduce an action that is known to be valid.
    fn apply(&mut self, action: Action) {
        debug_assert!(action
            .required_conversation()
            .map_or(true, |id| self.state.conversation(id).is_some()));
        let name = action.name();
        self.state = reduce(std::mem::take(&mut self.state), action);
        tracing::debug!(
            action = name,
            conversations = self.state.conversations.len(),
            active = self.state.active_conversation_id.as_deref().unwrap_or("-"),
            "store updated"
        );
    }

    /// Prepend a fresh conversation and make it active. Returns its id.
    pub fn create_conversation(&mut self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        self.apply(Action::CreateConversation(conversation));
        tracing::info!(conversation_id = %id, "conversation created");
        id
    }

    /// Make `id` active. The id is not validated.
    pub fn select_conversation(&mut self, id: impl Into<String>) {
        self.apply(Action::SelectConversation(id.into()));
    }

    pub fn update_conversation(&mut self, id: &str, messages: Vec<ChatMessage>) -> Result<()> {
        self.dispatch(Action::UpdateConversation {
            id: id.to_string(),
            messages,
            at: Utc::now(),
        })
    }

    pub fn delete_conversation(&mut self, id: &str) -> Result<()> {
        self.dispatch(Action::DeleteConversation(id.to_string()))?;
        tracing::info!(conversation_id = id, "conversation deleted");
        Ok(())
    }

    pub fn set_selected_model(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!(model = %name, "model selected");
        self.apply(Action::SetSelectedModel(name));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::initial(DEFAULT_MODEL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DEFAULT_TITLE;

    fn state_with(ids: &[&str]) -> AppState {
        let mut state = AppState::new(DEFAULT_MODEL);
        for id in ids.iter().rev() {
            state = reduce(state, Action::CreateConversation(Conversation::with_id(*id)));
        }
        state
    }

    #[test]
    fn test_initial_state() {
        let state = AppState::initial(DEFAULT_MODEL);
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.conversations[0].title, DEFAULT_TITLE);
        assert_eq!(state.active_conversation_id.as_deref(), Some(state.conversations[0].id.as_str()));
        assert_eq!(state.selected_model, "GPT-4");
    }

    #[test]
    fn test_create_prepends_and_activates() {
        let mut state = AppState::new(DEFAULT_MODEL);
        for id in ["a", "b", "c"] {
            state = reduce(state, Action::CreateConversation(Conversation::with_id(id)));
            assert_eq!(state.conversations[0].id, id);
            assert_eq!(state.active_conversation_id.as_deref(), Some(id));
        }
        let order: Vec<&str> = state.conversations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_select_does_not_validate() {
        let state = reduce(state_with(&["a"]), Action::SelectConversation("missing".into()));
        assert_eq!(state.active_conversation_id.as_deref(), Some("missing"));
        assert!(state.active_conversation().is_none());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let before = state_with(&["a", "b"]);
        let after = reduce(
            before.clone(),
            Action::UpdateConversation {
                id: "zzz".into(),
                messages: vec![ChatMessage::user("hi", None)],
                at: Utc::now(),
            },
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_update_replaces_messages_and_title() {
        let at = Utc::now();
        let state = reduce(
            state_with(&["a"]),
            Action::UpdateConversation {
                id: "a".into(),
                messages: vec![ChatMessage::user("Hello", None)],
                at,
            },
        );
        let conv = state.conversation("a").unwrap();
        assert_eq!(conv.title, "Hello");
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.updated_at, at);
    }

    #[test]
    fn test_delete_active_picks_first_remaining() {
        // Order is [a, b, c]; deleting the active "b" activates "a".
        let mut state = state_with(&["a", "b", "c"]);
        state = reduce(state, Action::SelectConversation("b".into()));
        state = reduce(state, Action::DeleteConversation("b".into()));
        assert_eq!(state.active_conversation_id.as_deref(), Some("a"));
        assert_eq!(state.conversations.len(), 2);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut state = state_with(&["a", "b"]);
        state = reduce(state, Action::DeleteConversation("b".into()));
        assert_eq!(state.active_conversation_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_delete_last_clears_active() {
        let state = reduce(state_with(&["a"]), Action::DeleteConversation("a".into()));
        assert!(state.conversations.is_empty());
        assert_eq!(state.active_conversation_id, None);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let before = state_with(&["a", "b"]);
        let after = reduce(before.clone(), Action::DeleteConversation("nope".into()));
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_selected_model_is_free_form() {
        let state = reduce(AppState::new(DEFAULT_MODEL), Action::SetSelectedModel("my-local-model".into()));
        assert_eq!(state.selected_model, "my-local-model");
    }

    #[test]
    fn test_store_reports_unknown_conversation() {
        let mut store = Store::default();
        let before = store.state().clone();
        let err = store.update_conversation("nope", Vec::new()).unwrap_err();
        assert_eq!(err, ChatError::ConversationNotFound("nope".into()));
        assert_eq!(store.state(), &before);

        assert!(store.delete_conversation("nope").is_err());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_only_update_and_delete_need_an_existing_conversation() {
        let at = Utc::now();
        assert_eq!(Action::CreateConversation(Conversation::with_id("a")).required_conversation(), None);
        assert_eq!(Action::SelectConversation("a".into()).required_conversation(), None);
        assert_eq!(Action::SetSelectedModel("Claude".into()).required_conversation(), None);
        assert_eq!(
            Action::UpdateConversation { id: "a".into(), messages: Vec::new(), at }.required_conversation(),
            Some("a")
        );
        assert_eq!(Action::DeleteConversation("a".into()).required_conversation(), Some("a"));
    }

    #[test]
    fn test_unvalidated_actions_apply_on_empty_store() {
        let mut store = Store::new(AppState::new(DEFAULT_MODEL));
        store.select_conversation("ghost");
        assert_eq!(store.active_conversation_id(), Some("ghost"));
        store.set_selected_model("Gemini");
        assert_eq!(store.selected_model(), "Gemini");
        let id = store.create_conversation();
        assert_eq!(store.active_conversation_id(), Some(id.as_str()));
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_store_create_returns_active_id() {
        let mut store = Store::default();
        let id = store.create_conversation();
        assert_eq!(store.active_conversation_id(), Some(id.as_str()));
        assert_eq!(store.conversations()[0].id, id);
        assert_eq!(store.conversations().len(), 2);
    }
}
