use crate::types::{InputItem, Message};

/// The ordered message history of one session.
///
/// Messages are only ever appended.  The session rolls a failed turn back to the length it had
/// before the turn, which removes nothing that existed before that turn began.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing has been said yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The history as request input items.
    pub fn input_items(&self) -> Vec<InputItem> {
        self.messages
            .iter()
            .flat_map(Message::to_input_items)
            .collect()
    }

    pub(crate) fn rollback(&mut self, len: usize) {
        self.messages.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolCallRecord;
    use serde_json::json;

    #[test]
    fn input_items_expand_tool_calls() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("hi"));
        conversation.push(Message::assistant_tool_calls(vec![
            ToolCallRecord::new("c1", "a", "{}"),
            ToolCallRecord::new("c2", "b", "{}"),
        ]));
        conversation.push(Message::tool_result("c1", json!({"ok": true})));
        conversation.push(Message::tool_result("c2", json!({"ok": true})));
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.input_items().len(), 5);
    }

    #[test]
    fn rollback_truncates() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("one"));
        conversation.push(Message::assistant("two"));
        conversation.push(Message::user("three"));
        conversation.rollback(2);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().and_then(Message::text), Some("two"));
    }
}
