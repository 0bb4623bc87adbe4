//! LLM-backed question phrasing and clarification.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::schema::{FieldDefinition, FieldType};
use crate::ports::{
    AIProvider, CallPurpose, CompletionRequest, Exchange, MessageRole, OracleError,
    QuestionGenerator, RequestMetadata,
};

const SYSTEM_PROMPT: &str = "You are a helpful Medical Device Classification Assistant.";

/// Phrases one question per missing field, and explains questions on request.
pub struct LlmQuestionGenerator {
    ai_provider: Arc<dyn AIProvider>,
}

impl LlmQuestionGenerator {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    fn create_question_prompt(field: &FieldDefinition, device_name: Option<&str>) -> String {
        let mut prompt = format!(
            "You need to collect information about this field: '{}'\nField Description: {}\n",
            field.name, field.description
        );
        if let Some(device) = device_name {
            prompt.push_str(&format!("The device being classified: {}\n", device));
        }

        let style = match field.field_type {
            FieldType::Boolean => "The answer is yes or no, so keep the question a simple yes/no question.".to_string(),
            FieldType::Text => "The answer is free text.".to_string(),
            FieldType::Choice(options) | FieldType::MultiChoice(options) => format!(
                "The answer is one of these values: {}. Mention the options naturally in the sentence.",
                options.join(", ")
            ),
        };

        prompt.push_str(&format!(
            r#"
Ask a SINGLE clear question.
{}

Rules:
- Return ONLY the question text.
- Do NOT list options like "Option 1", "Option 2".
- Do NOT add meta-text such as "Here is the question"."#,
            style
        ));
        prompt
    }

    fn create_clarification_prompt(exchange: &Exchange<'_>) -> String {
        format!(
            r#"The user is confused by the previous question.
Previous question: "{}"
User question: "{}"

Task:
1. Explain the medical device concept clearly and simply.
2. Re-state the original question in a friendlier way.

Rules:
- Speak directly to the user.
- Do NOT provide a list of options."#,
            exchange.last_question_or_none(),
            exchange.utterance
        )
    }

    /// Trims whitespace and quotation marks the model tends to add.
    fn clean(text: &str) -> Result<String, OracleError> {
        let cleaned = text.replace('"', "").trim().to_string();
        if cleaned.is_empty() {
            return Err(OracleError::EmptyResponse);
        }
        Ok(cleaned)
    }

    async fn generate(
        &self,
        session_id: SessionId,
        purpose: CallPurpose,
        prompt: String,
    ) -> Result<String, OracleError> {
        let request = CompletionRequest::new(RequestMetadata::new(session_id, purpose))
            .with_system_prompt(SYSTEM_PROMPT)
            .with_message(MessageRole::User, prompt)
            .with_temperature(0.0);

        let response = self.ai_provider.complete(request).await?;
        Self::clean(&response.content)
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn ask(
        &self,
        session_id: SessionId,
        field: &FieldDefinition,
        device_name: Option<&str>,
    ) -> Result<String, OracleError> {
        let prompt = Self::create_question_prompt(field, device_name);
        self.generate(session_id, CallPurpose::Question, prompt).await
    }

    async fn clarify(&self, exchange: Exchange<'_>) -> Result<String, OracleError> {
        let prompt = Self::create_clarification_prompt(&exchange);
        self.generate(exchange.session_id, CallPurpose::Clarification, prompt)
            .await
    }
}
