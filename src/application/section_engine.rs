//! Section engine.
//!
//! One call runs one section for one turn:
//!
//! ```text
//! guard ─► detect input ─► intent ─┬─► clarify                (question)
//!                                  └─► extract ─► find missing ─┬─► ask      (question)
//!                                                               └─► complete (status)
//! ```
//!
//! The engine only reads the conversation; everything it decides comes
//! back as a [`SectionDelta`] for the session loop to apply.

use std::sync::Arc;

use super::TurnError;
use crate::adapters::dialogue::{LlmFactExtractor, LlmIntentClassifier, LlmQuestionGenerator};
use crate::domain::conversation::{
    next_missing_field, plan_sections, ConversationState, Message, SectionDelta, SectionOutcome,
};
use crate::domain::schema::{FactSet, FactValue, SectionId};
use crate::ports::{AIProvider, Exchange, FactExtractor, Intent, IntentClassifier, QuestionGenerator};

const DEVICE_NAME_FIELD: &str = "device_name";

/// Runs the per-section state machine.
pub struct SectionEngine {
    intent: Arc<dyn IntentClassifier>,
    extractor: Arc<dyn FactExtractor>,
    questions: Arc<dyn QuestionGenerator>,
}

impl SectionEngine {
    pub fn new(
        intent: Arc<dyn IntentClassifier>,
        extractor: Arc<dyn FactExtractor>,
        questions: Arc<dyn QuestionGenerator>,
    ) -> Self {
        Self {
            intent,
            extractor,
            questions,
        }
    }

    /// Engine whose oracles all prompt the same provider.
    pub fn with_provider(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self::new(
            Arc::new(LlmIntentClassifier::new(ai_provider.clone())),
            Arc::new(LlmFactExtractor::new(ai_provider.clone())),
            Arc::new(LlmQuestionGenerator::new(ai_provider)),
        )
    }

    /// Runs `section` against the current conversation.
    ///
    /// # Errors
    ///
    /// Only question phrasing failures are returned. A failed intent check
    /// is treated as an answer and a failed extraction as an empty one.
    pub async fn run(
        &self,
        section: SectionId,
        state: &ConversationState,
    ) -> Result<SectionDelta, TurnError> {
        if section.is_triage() && state.triage_complete() {
            tracing::debug!("Triage already complete, skipping");
            return Ok(SectionDelta::skipped(section));
        }
        tracing::debug!(section = %section, "Running section");

        let session_id = *state.id();
        let mut updates = FactSet::new();

        if let Some(utterance) = state.pending_user_utterance() {
            let exchange = Exchange {
                session_id,
                last_question: state.last_bot_question(),
                utterance,
            };

            if self.detect_intent(exchange).await == Intent::Clarification {
                let explanation = self
                    .questions
                    .clarify(exchange)
                    .await
                    .map_err(TurnError::Question)?;
                return Ok(SectionDelta {
                    section,
                    fact_updates: FactSet::new(),
                    message: Some(Message::question(explanation)?),
                    outcome: SectionOutcome::Clarified,
                });
            }

            updates = self.extract(exchange, section, state.facts()).await;
        }

        let mut working = state.facts().clone();
        working.merge(updates.clone());

        if let Some(field) = next_missing_field(section.fields(), &working) {
            tracing::info!(section = %section, field = field.name, "Asking for missing field");
            let device_name = working.get(DEVICE_NAME_FIELD).and_then(FactValue::as_text);
            let question = self
                .questions
                .ask(session_id, field, device_name)
                .await
                .map_err(TurnError::Question)?;
            return Ok(SectionDelta {
                section,
                fact_updates: updates,
                message: Some(Message::question(question)?),
                outcome: SectionOutcome::Asked { field: field.name },
            });
        }

        let schedule = section.is_triage().then(|| plan_sections(&working));
        tracing::info!(section = %section, schedule = ?schedule, "Section complete");
        Ok(SectionDelta {
            section,
            fact_updates: updates,
            message: Some(Message::status(section.completion_message())?),
            outcome: SectionOutcome::Completed { schedule },
        })
    }

    async fn detect_intent(&self, exchange: Exchange<'_>) -> Intent {
        match self.intent.classify_intent(exchange).await {
            Ok(intent) => {
                tracing::debug!(intent = ?intent, "Intent detected");
                intent
            }
            Err(e) => {
                tracing::warn!(error = %e, "Intent check failed, treating input as an answer");
                Intent::Answer
            }
        }
    }

    async fn extract(&self, exchange: Exchange<'_>, section: SectionId, known: &FactSet) -> FactSet {
        match self.extractor.extract_facts(exchange, section, known).await {
            Ok(extracted) => {
                let fields: Vec<&str> = extracted.updates.iter().map(|(name, _)| name).collect();
                tracing::info!(section = %section, fields = ?fields, "Facts extracted");
                if !extracted.rejected.is_empty() {
                    tracing::warn!(
                        section = %section,
                        rejected = extracted.rejected.len(),
                        "Discarded invalid extracted values"
                    );
                }
                extracted.updates
            }
            Err(e) => {
                tracing::warn!(section = %section, error = %e, "Extraction failed, no facts updated");
                FactSet::new()
            }
        }
    }
}
