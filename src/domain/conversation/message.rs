//! Message entity for the classification dialogue.
//!
//! Messages are immutable records of user/assistant exchanges. Each bot
//! message carries an explicit [`MessageKind`] so routing never has to
//! inspect message text.

use crate::domain::foundation::{DomainError, MessageId, Timestamp};
use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// What a message is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Free text typed by the user.
    Utterance,
    /// A bot question awaiting an answer (including clarifications).
    Question,
    /// A bot progress marker, e.g. a section completing.
    Status,
    /// The final classification report.
    Report,
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - user messages are always [`MessageKind::Utterance`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    kind: MessageKind,
    content: String,
    created_at: Timestamp,
}

impl Message {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn user(content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Role::User, MessageKind::Utterance, content)
    }

    /// Creates a bot question.
    pub fn question(content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Role::Assistant, MessageKind::Question, content)
    }

    /// Creates a bot status line.
    pub fn status(content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Role::Assistant, MessageKind::Status, content)
    }

    /// Creates the classification report message.
    pub fn report(content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Role::Assistant, MessageKind::Report, content)
    }

    fn new(role: Role, kind: MessageKind, content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Message content cannot be empty",
            ));
        }

        Ok(Self {
            id: MessageId::new(),
            role,
            kind,
            content,
            created_at: Timestamp::now(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this is a bot question.
    pub fn is_question(&self) -> bool {
        self.role == Role::Assistant && self.kind == MessageKind::Question
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_are_utterances() {
        let msg = Message::user("It is a scalpel").unwrap();
        assert!(msg.is_user());
        assert_eq!(msg.kind(), MessageKind::Utterance);
        assert_eq!(msg.content(), "It is a scalpel");
    }

    #[test]
    fn rejects_blank_content() {
        assert!(Message::user("   ").is_err());
        assert!(Message::question("").is_err());
    }

    #[test]
    fn only_assistant_questions_are_questions() {
        assert!(Message::question("Is it invasive?").unwrap().is_question());
        assert!(!Message::status("triage done").unwrap().is_question());
        assert!(!Message::user("Is it invasive?").unwrap().is_question());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&MessageKind::Report).unwrap();
        assert_eq!(json, "\"report\"");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::status("a").unwrap();
        let b = Message::status("a").unwrap();
        assert_ne!(a.id(), b.id());
    }
}
