//! Conversation with the lab tutor.
//!
//! The log is append-only. A question is recorded as soon as it is asked; the
//! reply (or the fallback apology) is appended when the tutor finishes. Only one
//! question may be awaiting a reply at a time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Welcome to the photosynthesis lab! Adjust the controls and watch the \
plant respond, or ask me how each factor affects growth.";

/// Reply used whenever the tutor cannot produce an answer.
pub const FALLBACK_REPLY: &str =
    "Sorry, my biology brain hit a small snag. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Why a question was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskRejected {
    Empty,
    Busy,
}

impl AskRejected {
    pub fn message(self) -> &'static str {
        match self {
            AskRejected::Empty => "question is empty",
            AskRejected::Busy => "tutor is still answering the previous question",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: Vec<Message>,
    awaiting_reply: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            awaiting_reply: false,
        }
    }

    /// Record a user question. Returns the trimmed question to forward to the tutor.
    pub fn ask(&mut self, question: &str) -> Result<String, AskRejected> {
        let q = question.trim();
        if q.is_empty() {
            return Err(AskRejected::Empty);
        }
        if self.awaiting_reply {
            return Err(AskRejected::Busy);
        }
        self.messages.push(Message::user(q));
        self.awaiting_reply = true;
        Ok(q.to_string())
    }

    /// Record the tutor's reply to the pending question.
    pub fn reply(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
        self.awaiting_reply = false;
    }

    #[inline]
    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_greeting() {
        let log = ChatLog::new();
        assert_eq!(log.messages(), &[Message::assistant(GREETING)]);
        assert!(!log.awaiting_reply());
    }

    #[test]
    fn blank_questions_are_rejected() {
        let mut log = ChatLog::new();
        assert_eq!(log.ask("   \n"), Err(AskRejected::Empty));
        assert_eq!(log.messages().len(), 1);
    }

    #[test]
    fn one_question_at_a_time() {
        let mut log = ChatLog::new();
        assert_eq!(log.ask("  why is it hot? ").as_deref(), Ok("why is it hot?"));
        assert_eq!(log.ask("and now?"), Err(AskRejected::Busy));

        log.reply("because");
        assert!(log.ask("and now?").is_ok());

        let roles: Vec<Role> = log.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Assistant, Role::User, Role::Assistant, Role::User]
        );
    }
}
