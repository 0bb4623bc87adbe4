//! LLM-backed fact extraction with a per-section response schema.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::domain::conversation::{DataExtractor, ExtractedFacts};
use crate::domain::schema::{FactSet, SectionId};
use crate::ports::{
    AIProvider, CallPurpose, CompletionRequest, Exchange, FactExtractor, MessageRole, OracleError,
    RequestMetadata, ResponseSchema,
};

/// Asks the model to fill a section's fields from the user's answer.
pub struct LlmFactExtractor {
    ai_provider: Arc<dyn AIProvider>,
    extractor: DataExtractor,
}

impl LlmFactExtractor {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self {
            ai_provider,
            extractor: DataExtractor::new(),
        }
    }

    /// Strict object schema over every field of the section.
    ///
    /// Every field is required and nullable, so "not mentioned" is an
    /// explicit `null` rather than a missing key.
    pub fn section_schema(section: SectionId) -> ResponseSchema {
        let fields = section.fields();
        let properties: Map<String, Value> = fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = fields.iter().map(|f| f.name).collect();

        ResponseSchema::new(
            format!("{}_facts", section.as_str()),
            json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }),
        )
    }

    fn create_prompt(exchange: &Exchange<'_>, section: SectionId, known: &FactSet) -> String {
        format!(
            r#"TASK: Update the medical device data for the "{}" section.

Current Known Data: {}

The Bot just asked: "{}"
The User just answered: "{}"

INSTRUCTIONS:
1. Update fields based strictly on the User's answer.
2. If the user says "No" or "Yes", apply it ONLY to the field relevant to the Bot's last question.
3. Leave every field the answer does not address as null. Never guess.
4. Use only the listed values for fields with a fixed set of options."#,
            section,
            known.section_snapshot(section),
            exchange.last_question_or_none(),
            exchange.utterance
        )
    }
}

#[async_trait]
impl FactExtractor for LlmFactExtractor {
    async fn extract_facts(
        &self,
        exchange: Exchange<'_>,
        section: SectionId,
        known: &FactSet,
    ) -> Result<ExtractedFacts, OracleError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            exchange.session_id,
            CallPurpose::Extraction,
        ))
        .with_message(
            MessageRole::User,
            Self::create_prompt(&exchange, section, known),
        )
        .with_temperature(0.0)
        .with_response_schema(Self::section_schema(section));

        let response = self.ai_provider.complete(request).await?;
        let extracted = self.extractor.extract(section.fields(), &response.content)?;

        for rejected in &extracted.rejected {
            tracing::debug!(section = %section, error = %rejected, "Discarded extracted value");
        }
        if !extracted.ignored.is_empty() {
            tracing::debug!(section = %section, keys = ?extracted.ignored, "Ignored unknown keys");
        }

        Ok(extracted)
    }
}
