pub mod simulated;

use async_trait::async_trait;

use crate::error::Result;
use crate::state::ChatMessage;

pub use simulated::SimulatedResponder;

/// Produces the assistant's next turn for a conversation.
///
/// `history` ends with the user message being answered. Implementations
/// must not modify the conversation themselves; the caller appends the
/// returned message.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn submit(&self, history: &[ChatMessage], model: &str) -> Result<ChatMessage>;
}
