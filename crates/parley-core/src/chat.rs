//! Send/regenerate protocol for the active conversation.
//!
//! A [`ChatSession`] is either idle, waiting out the short pause before a
//! regenerated prompt is resubmitted, or waiting on a reply task. Pending
//! work is keyed by the conversation it belongs to and is cancelled as soon
//! as that conversation stops being the active one.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::ai::Responder;
use crate::capability::{ClipboardWriter, FilePicker, SelectedFile};
use crate::error::{ChatError, Result};
use crate::state::ChatMessage;
use crate::store::Store;

/// Pause between truncating history and asking for a fresh reply.
pub const REGENERATE_DELAY: Duration = Duration::from_millis(100);

enum Phase {
    Idle,
    Resubmitting {
        conversation_id: String,
        history: Vec<ChatMessage>,
        due: Instant,
    },
    AwaitingReply {
        conversation_id: String,
        history: Vec<ChatMessage>,
        task: JoinHandle<Result<ChatMessage>>,
    },
}

/// Something that happened to the pending exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    ReplyRequested { conversation_id: String },
    ReplyDelivered { conversation_id: String },
    ReplyFailed { conversation_id: String, error: ChatError },
    Cancelled { conversation_id: String },
}

pub struct ChatSession {
    responder: Arc<dyn Responder>,
    phase: Phase,
    input: String,
    cursor: usize, // in characters
    selected_file: Option<SelectedFile>,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl ChatSession {
    pub fn new(responder: Arc<dyn Responder>) -> Self {
        Self {
            responder,
            phase: Phase::Idle,
            input: String::new(),
            cursor: 0,
            selected_file: None,
        }
    }

    // Input buffer

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, text: &str) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert_str(byte_pos, text);
        self.cursor += text.chars().count();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Exchange state

    pub fn is_pending(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Conversation the pending exchange belongs to.
    pub fn pending_conversation(&self) -> Option<&str> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Resubmitting { conversation_id, .. } | Phase::AwaitingReply { conversation_id, .. } => {
                Some(conversation_id)
            }
        }
    }

    /// Send is enabled: non-blank input and nothing in flight.
    pub fn can_send(&self) -> bool {
        !self.is_pending() && !self.input.trim().is_empty()
    }

    /// Regenerate is offered once the active conversation has any message.
    pub fn can_regenerate(&self, store: &Store) -> bool {
        !self.is_pending()
            && store
                .active_conversation()
                .map(|c| !c.messages.is_empty())
                .unwrap_or(false)
    }

    /// Append the input as a user message and request a reply.
    pub fn send(&mut self, store: &mut Store) -> Result<()> {
        if self.is_pending() {
            return Err(ChatError::ReplyPending);
        }
        if self.input.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        let conversation = store
            .active_conversation()
            .ok_or(ChatError::NoActiveConversation)?;

        let conversation_id = conversation.id.clone();
        let model = store.selected_model().to_string();
        let mut history = conversation.messages.clone();
        history.push(ChatMessage::user(self.input.clone(), Some(model.clone())));

        store.update_conversation(&conversation_id, history.clone())?;
        self.clear_input();

        tracing::info!(conversation_id = %conversation_id, model = %model, "message sent");
        self.request_reply(conversation_id, history, model);
        Ok(())
    }

    /// Drop everything after the last user message and ask again.
    pub fn regenerate(&mut self, store: &mut Store) -> Result<()> {
        if self.is_pending() {
            return Err(ChatError::ReplyPending);
        }
        let conversation = store
            .active_conversation()
            .ok_or(ChatError::NoActiveConversation)?;
        let index = conversation
            .last_user_message_index()
            .ok_or(ChatError::NoPriorUserMessage)?;

        let conversation_id = conversation.id.clone();
        let history = conversation.messages[..=index].to_vec();
        let prompt = history[index].content.clone();

        store.update_conversation(&conversation_id, history.clone())?;
        self.set_input(prompt);

        tracing::info!(conversation_id = %conversation_id, kept = history.len(), "regenerating last reply");
        self.phase = Phase::Resubmitting {
            conversation_id,
            history,
            due: Instant::now() + REGENERATE_DELAY,
        };
        Ok(())
    }

    /// Make progress without blocking: resubmit once the regenerate pause is
    /// over, or land a reply whose task has finished.
    pub async fn tick(&mut self, store: &mut Store) -> Option<ChatEvent> {
        let ready = match &self.phase {
            Phase::Idle => return None,
            Phase::Resubmitting { due, .. } => Instant::now() >= *due,
            Phase::AwaitingReply { task, .. } => task.is_finished(),
        };
        if ready {
            self.advance(store).await
        } else {
            None
        }
    }

    /// Wait for the pending exchange to finish. Returns the last event.
    pub async fn settle(&mut self, store: &mut Store) -> Option<ChatEvent> {
        let mut last = None;
        loop {
            match &self.phase {
                Phase::Idle => return last,
                Phase::Resubmitting { due, .. } => tokio::time::sleep_until(*due).await,
                Phase::AwaitingReply { .. } => {}
            }
            last = self.advance(store).await.or(last);
        }
    }

    /// Cancel pending work that no longer belongs to the active conversation.
    pub fn conversation_changed(&mut self, store: &Store) -> Option<ChatEvent> {
        let pending = self.pending_conversation()?;
        let still_active = store.active_conversation_id() == Some(pending)
            && store.conversation(pending).is_some();
        if still_active {
            None
        } else {
            self.cancel()
        }
    }

    pub fn cancel(&mut self) -> Option<ChatEvent> {
        let conversation_id = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => return None,
            Phase::Resubmitting { conversation_id, .. } => {
                // The input only held the regenerated prompt.
                self.clear_input();
                conversation_id
            }
            Phase::AwaitingReply { conversation_id, task, .. } => {
                task.abort();
                conversation_id
            }
        };
        tracing::info!(conversation_id = %conversation_id, "pending reply cancelled");
        Some(ChatEvent::Cancelled { conversation_id })
    }

    async fn advance(&mut self, store: &mut Store) -> Option<ChatEvent> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Resubmitting { conversation_id, history, .. } => {
                self.clear_input();
                let model = store.selected_model().to_string();
                self.request_reply(conversation_id.clone(), history, model);
                Some(ChatEvent::ReplyRequested { conversation_id })
            }
            Phase::AwaitingReply { conversation_id, mut history, task } => {
                let outcome = match task.await {
                    Ok(result) => result,
                    Err(e) => Err(ChatError::Reply(e.to_string())),
                };
                match outcome {
                    Ok(reply) => {
                        history.push(reply);
                        match store.update_conversation(&conversation_id, history) {
                            Ok(()) => {
                                tracing::info!(conversation_id = %conversation_id, "reply delivered");
                                Some(ChatEvent::ReplyDelivered { conversation_id })
                            }
                            Err(error) => {
                                tracing::warn!(conversation_id = %conversation_id, %error, "reply dropped");
                                Some(ChatEvent::ReplyFailed { conversation_id, error })
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(conversation_id = %conversation_id, %error, "reply failed");
                        Some(ChatEvent::ReplyFailed { conversation_id, error })
                    }
                }
            }
        }
    }

    fn request_reply(&mut self, conversation_id: String, history: Vec<ChatMessage>, model: String) {
        let responder = Arc::clone(&self.responder);
        let prompt_history = history.clone();
        let task = tokio::spawn(async move { responder.submit(&prompt_history, &model).await });
        self.phase = Phase::AwaitingReply {
            conversation_id,
            history,
            task,
        };
    }

    // Message actions

    /// Best-effort copy of a message's content.
    pub fn copy_message(&self, clipboard: &dyn ClipboardWriter, message: &ChatMessage) -> Result<()> {
        clipboard.write_text(&message.content)
    }

    // Attachment

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    /// Hold on to a picked file. It is never read or sent anywhere.
    pub fn attach(&mut self, picker: &dyn FilePicker, path: &Path) -> Result<&SelectedFile> {
        let file = picker.pick(path)?;
        tracing::info!(name = %file.name, size = file.size, "file selected");
        Ok(&*self.selected_file.insert(file))
    }

    pub fn clear_attachment(&mut self) {
        self.selected_file = None;
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if let Phase::AwaitingReply { task, .. } = &self.phase {
            task.abort();
        }
    }
}
