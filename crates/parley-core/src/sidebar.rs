use crate::state::Conversation;

/// Conversations whose title contains `query`, ignoring case. Order is kept.
pub fn filter_conversations<'a>(conversations: &'a [Conversation], query: &str) -> Vec<&'a Conversation> {
    let needle = query.to_lowercase();
    conversations
        .iter()
        .filter(|c| needle.is_empty() || c.title.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(id: &str, title: &str) -> Conversation {
        let mut conv = Conversation::with_id(id);
        conv.title = title.to_string();
        conv
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let convs = vec![titled("1", "Rust lifetimes"), titled("2", "Dinner ideas")];
        assert_eq!(filter_conversations(&convs, "").len(), 2);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_ordered() {
        let convs = vec![
            titled("1", "Rust lifetimes"),
            titled("2", "Dinner ideas"),
            titled("3", "TRUST issues"),
        ];
        let ids: Vec<&str> = filter_conversations(&convs, "rUsT")
            .into_iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_no_match() {
        let convs = vec![titled("1", "New Chat")];
        assert!(filter_conversations(&convs, "weather").is_empty());
    }
}
