//! Chat transcript between the user and the tutor.

use serde::{Deserialize, Serialize};

/// Greeting shown before the user says anything.
pub const GREETING: &str = "こんにちは！お月さまのことで知りたいことがあったら聞いてね！";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

/// Ordered conversation with at most one reply pending at a time.
#[derive(Clone, Debug)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::Model,
                text: GREETING.to_string(),
            }],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record a user message and mark a reply as pending.
    ///
    /// Returns the text to send, or `None` if the input is blank or a reply is
    /// still outstanding.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        self.messages.push(ChatMessage {
            role: Role::User,
            text: text.to_string(),
        });
        self.pending = true;
        Some(text.to_string())
    }

    /// Append the tutor's reply and clear the pending flag.
    pub fn receive(&mut self, reply: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Model,
            text: reply.into(),
        });
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_greeting() {
        let chat = ChatTranscript::new();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Model);
    }

    #[test]
    fn test_blank_input_rejected() {
        let mut chat = ChatTranscript::new();
        assert!(chat.submit("   ").is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn test_one_reply_at_a_time() {
        let mut chat = ChatTranscript::new();
        assert_eq!(chat.submit(" なぜ月は光るの？ ").as_deref(), Some("なぜ月は光るの？"));
        assert!(chat.submit("もうひとつ").is_none());

        chat.receive("太陽の光をはね返しているからだよ。");
        assert!(!chat.is_pending());
        assert!(chat.submit("もうひとつ").is_some());

        let roles: Vec<_> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Model, Role::User, Role::Model, Role::User]);
    }
}
