use thiserror::Error;

/// Everything that can go wrong while driving a conversation.
///
/// The first five variants describe requests the front end is expected to
/// swallow (the button would have been disabled); see [`ChatError::is_silent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("message input is empty")]
    EmptyInput,

    #[error("no user message to regenerate from")]
    NoPriorUserMessage,

    #[error("a reply is already pending")]
    ReplyPending,

    #[error("no conversation is active")]
    NoActiveConversation,

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("file unavailable: {0}")]
    FileUnavailable(String),

    #[error("reply failed: {0}")]
    Reply(String),
}

impl ChatError {
    /// True for rejections that should degrade to a no-op rather than be shown.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            ChatError::ConversationNotFound(_)
                | ChatError::EmptyInput
                | ChatError::NoPriorUserMessage
                | ChatError::ReplyPending
                | ChatError::NoActiveConversation
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_errors() {
        assert!(ChatError::EmptyInput.is_silent());
        assert!(ChatError::ConversationNotFound("x".into()).is_silent());
        assert!(!ChatError::Clipboard("no display".into()).is_silent());
        assert!(!ChatError::UnsupportedFile("a.exe".into()).is_silent());
        assert!(!ChatError::Reply("task cancelled".into()).is_silent());
        assert_eq!(
            ChatError::Reply("task cancelled".into()).to_string(),
            "reply failed: task cancelled"
        );
    }
}
