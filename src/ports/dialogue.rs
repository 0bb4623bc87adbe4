//! Dialogue oracle ports.
//!
//! The four language-understanding steps the section engine relies on.
//! Each is a narrow contract; the engine decides what to do when one fails.

use async_trait::async_trait;
use thiserror::Error;

use super::AIError;
use crate::domain::conversation::{ClassificationReport, ExtractedFacts, ExtractionError};
use crate::domain::foundation::SessionId;
use crate::domain::schema::{FactSet, FieldDefinition, SectionId};

/// What the user meant by their latest message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Supplying information.
    Answer,
    /// Asking what the last question means.
    Clarification,
}

/// Failure of a dialogue oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("model call failed: {0}")]
    Provider(#[from] AIError),

    #[error("could not read model output: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("unrecognised model output: {0}")]
    Unrecognized(String),
}

/// The latest user utterance and the question it answers.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub session_id: SessionId,
    /// `None` when no bot question precedes the utterance.
    pub last_question: Option<&'a str>,
    pub utterance: &'a str,
}

impl Exchange<'_> {
    /// The last question, or the literal `None` the prompts expect.
    pub fn last_question_or_none(&self) -> &str {
        self.last_question.unwrap_or("None")
    }
}

/// Classifies an utterance as an answer or a clarification request.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify_intent(&self, exchange: Exchange<'_>) -> Result<Intent, OracleError>;
}

/// Maps free text onto a section's fields.
#[async_trait]
pub trait FactExtractor: Send + Sync {
    /// Extracts only the facts the utterance explicitly addresses.
    ///
    /// `known` is the section's current snapshot.
    async fn extract_facts(
        &self,
        exchange: Exchange<'_>,
        section: SectionId,
        known: &FactSet,
    ) -> Result<ExtractedFacts, OracleError>;
}

/// Phrases questions and clarifications.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// One question about one missing field.
    async fn ask(
        &self,
        session_id: SessionId,
        field: &FieldDefinition,
        device_name: Option<&str>,
    ) -> Result<String, OracleError>;

    /// Explains the last question and restates it more simply.
    async fn clarify(&self, exchange: Exchange<'_>) -> Result<String, OracleError>;
}

/// Produces the final classification from the collected facts.
#[async_trait]
pub trait DeviceClassifier: Send + Sync {
    async fn classify(
        &self,
        session_id: SessionId,
        facts: &FactSet,
        rules: &str,
    ) -> Result<ClassificationReport, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_question_renders_as_none() {
        let exchange = Exchange {
            session_id: SessionId::new(),
            last_question: None,
            utterance: "hello",
        };
        assert_eq!(exchange.last_question_or_none(), "None");
    }

    #[test]
    fn provider_errors_convert() {
        let err: OracleError = AIError::AuthenticationFailed.into();
        assert_eq!(err.to_string(), "model call failed: authentication failed");
    }
}
