//! End-to-end behaviour of the store and the chat session together.

use std::sync::Arc;

use parley_core::ai::simulated::simulated_reply;
use parley_core::state::{DEFAULT_TITLE, TITLE_MAX_CHARS};
use parley_core::{ChatError, ChatRole, ChatSession, SimulatedResponder, Store};

fn chat() -> ChatSession {
    ChatSession::new(Arc::new(SimulatedResponder::default()))
}

#[test]
fn new_conversations_are_prepended_and_activated() {
    let mut store = Store::default();
    for _ in 0..5 {
        let id = store.create_conversation();
        assert_eq!(store.conversations()[0].id, id);
        assert_eq!(store.active_conversation_id(), Some(id.as_str()));
    }
    assert_eq!(store.conversations().len(), 6);
}

#[test]
fn updating_unknown_conversation_changes_nothing() {
    let mut store = Store::default();
    store.create_conversation();
    let before = store.conversations().to_vec();

    let result = store.update_conversation("does-not-exist", Vec::new());

    assert!(matches!(result, Err(ChatError::ConversationNotFound(_))));
    assert_eq!(store.conversations(), before.as_slice());
}

#[tokio::test(start_paused = true)]
async fn first_message_names_the_conversation() {
    let mut store = Store::default();
    assert_eq!(store.active_conversation().unwrap().title, DEFAULT_TITLE);

    let mut chat = chat();
    chat.set_input("Hello");
    chat.send(&mut store).unwrap();
    assert_eq!(store.active_conversation().unwrap().title, "Hello");

    chat.settle(&mut store).await;
    assert_eq!(store.active_conversation().unwrap().title, "Hello");
}

#[tokio::test(start_paused = true)]
async fn long_first_message_is_truncated_into_title() {
    let mut store = Store::default();
    let content = "Explain the difference between ownership and borrowing in detail please";
    assert!(content.chars().count() > TITLE_MAX_CHARS);

    let mut chat = chat();
    chat.set_input(content);
    chat.send(&mut store).unwrap();

    let expected = format!("{}...", &content[..TITLE_MAX_CHARS]);
    assert_eq!(store.active_conversation().unwrap().title, expected);
    chat.cancel();
}

#[tokio::test(start_paused = true)]
async fn regenerate_replaces_the_only_reply() {
    let mut store = Store::default();
    let mut chat = chat();
    chat.set_input("Hello");
    chat.send(&mut store).unwrap();
    chat.settle(&mut store).await;

    let old_reply = store.active_conversation().unwrap().messages[1].clone();

    chat.regenerate(&mut store).unwrap();
    chat.settle(&mut store).await;

    let messages = &store.active_conversation().unwrap().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[0].content, "Hello");
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].content, simulated_reply("Hello"));
    assert!(messages.iter().all(|m| m.id != old_reply.id));
}

#[tokio::test]
async fn regenerate_on_empty_conversation_is_noop() {
    let mut store = Store::default();
    let before = store.state().clone();
    let mut chat = chat();

    assert_eq!(chat.regenerate(&mut store), Err(ChatError::NoPriorUserMessage));
    assert_eq!(store.state(), &before);
    assert!(!chat.is_pending());
}

#[test]
fn deleting_active_of_two_activates_the_other() {
    let mut store = Store::default();
    let older = store.active_conversation_id().unwrap().to_string();
    let newer = store.create_conversation();

    store.delete_conversation(&newer).unwrap();

    assert_eq!(store.conversations().len(), 1);
    assert_eq!(store.active_conversation_id(), Some(older.as_str()));
}

#[test]
fn deleting_last_conversation_leaves_nothing_active() {
    let mut store = Store::default();
    let only = store.active_conversation_id().unwrap().to_string();

    store.delete_conversation(&only).unwrap();

    assert!(store.conversations().is_empty());
    assert!(store.active_conversation().is_none());
    assert_eq!(store.active_conversation_id(), None);
}

#[tokio::test(start_paused = true)]
async fn model_selection_tags_new_messages() {
    let mut store = Store::default();
    store.set_selected_model("Gemini");

    let mut chat = chat();
    chat.set_input("hi");
    chat.send(&mut store).unwrap();
    chat.settle(&mut store).await;

    let messages = &store.active_conversation().unwrap().messages;
    assert!(messages.iter().all(|m| m.model.as_deref() == Some("Gemini")));
}
