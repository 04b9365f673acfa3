//! UI-agnostic conversation types
//!
//! This module contains data structures that are shared between front ends
//! and don't depend on any specific UI framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a conversation until its first message arrives.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Derived titles keep at most this many characters before the ellipsis.
pub const TITLE_MAX_CHARS: usize = 50;

/// Fresh time-ordered identifier for messages and conversations.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// A single turn in a conversation. Never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>, model: Option<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            model,
        }
    }

    pub fn user(content: impl Into<String>, model: Option<String>) -> Self {
        Self::new(ChatRole::User, content, model)
    }

    pub fn assistant(content: impl Into<String>, model: Option<String>) -> Self {
        Self::new(ChatRole::Assistant, content, model)
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn label(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "AI",
        }
    }
}

/// A titled, ordered thread of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_id(new_id())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Index of the most recent user message, scanning from the end.
    pub fn last_user_message_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.role == ChatRole::User)
    }

    /// Swap in a whole new message list.
    ///
    /// The title is derived from the first message only while it still holds
    /// the placeholder; after that it never changes.
    pub(crate) fn replace_messages(&mut self, messages: Vec<ChatMessage>, at: DateTime<Utc>) {
        if self.has_default_title() {
            if let Some(first) = messages.first() {
                self.title = derive_title(&first.content);
            }
        }
        self.messages = messages;
        self.updated_at = at;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// First [`TITLE_MAX_CHARS`] characters of `content`, plus `...` if cut.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title_short() {
        assert_eq!(derive_title("Hello"), "Hello");
    }

    #[test]
    fn test_derive_title_exactly_max() {
        let content = "a".repeat(TITLE_MAX_CHARS);
        assert_eq!(derive_title(&content), content);
    }

    #[test]
    fn test_derive_title_truncates() {
        let content = "b".repeat(TITLE_MAX_CHARS + 7);
        let title = derive_title(&content);
        assert_eq!(title, format!("{}...", "b".repeat(TITLE_MAX_CHARS)));
    }

    #[test]
    fn test_derive_title_counts_characters_not_bytes() {
        let content = "é".repeat(TITLE_MAX_CHARS + 1);
        let title = derive_title(&content);
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS + 3);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_title_only_derived_once() {
        let mut conv = Conversation::new();
        let at = Utc::now();
        conv.replace_messages(vec![ChatMessage::user("first question", None)], at);
        assert_eq!(conv.title, "first question");

        conv.replace_messages(vec![ChatMessage::user("something else", None)], at);
        assert_eq!(conv.title, "first question");
    }

    #[test]
    fn test_empty_messages_keep_placeholder() {
        let mut conv = Conversation::new();
        conv.replace_messages(Vec::new(), Utc::now());
        assert_eq!(conv.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_last_user_message_index() {
        let mut conv = Conversation::new();
        assert_eq!(conv.last_user_message_index(), None);

        conv.messages = vec![
            ChatMessage::user("q1", None),
            ChatMessage::assistant("a1", None),
            ChatMessage::user("q2", None),
            ChatMessage::assistant("a2", None),
        ];
        assert_eq!(conv.last_user_message_index(), Some(2));

        conv.messages = vec![ChatMessage::assistant("hello", None)];
        assert_eq!(conv.last_user_message_index(), None);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
