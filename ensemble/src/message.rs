//! Chat message types flowing through the supervisor state.
//!
//! One shared enum for system, user, assistant, and tool messages. Serde is
//! derived because the whole state is checkpointed as JSON.

use serde::{Deserialize, Serialize};

/// One message in the conversation.
///
/// Tool results are first-class messages so checkpoint history shows every
/// hop (supervisor transfer, worker tool output) the way the run produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    /// System instructions (supervisor prompt, agent instructions).
    System(String),
    /// User input.
    User(String),
    /// Assistant output (supervisor or worker LLM turn).
    Assistant(String),
    /// Tool output, tagged with the tool name that produced it.
    Tool { name: String, content: String },
}

impl Message {
    /// Text content of the message regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) => s,
            Message::Tool { content, .. } => content,
        }
    }

    /// Role label used in transcripts and logs.
    pub fn role(&self) -> &'static str {
        match self {
            Message::System(_) => "system",
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
            Message::Tool { .. } => "tool",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: content() returns the inner text for every variant.
    #[test]
    fn message_content_all_variants() {
        assert_eq!(Message::System("a".into()).content(), "a");
        assert_eq!(Message::User("b".into()).content(), "b");
        assert_eq!(Message::Assistant("c".into()).content(), "c");
        assert_eq!(
            Message::Tool {
                name: "gmail".into(),
                content: "d".into()
            }
            .content(),
            "d"
        );
    }

    /// **Scenario**: Messages roundtrip through serde_json (checkpoint format).
    #[test]
    fn message_serde_roundtrip() {
        let m = Message::Tool {
            name: "search".into(),
            content: "result".into(),
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }
}
