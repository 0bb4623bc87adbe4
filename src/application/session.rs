//! Classification session - the turn loop.
//!
//! A turn appends the user's message, then routes and runs sections until
//! a question is outstanding or the report has been produced.

use std::sync::Arc;

use super::{SectionEngine, TurnError};
use crate::adapters::dialogue::LlmDeviceClassifier;
use crate::domain::conversation::{route, ConversationState, Message, Route, SectionOutcome};
use crate::ports::{AIProvider, DeviceClassifier};

/// Opening question of every session.
pub const GREETING: &str = "Please describe the medical device you want to classify.";

/// Drives a conversation from the first description to the report.
pub struct ClassificationSession {
    engine: SectionEngine,
    classifier: Arc<dyn DeviceClassifier>,
    rules: String,
}

impl ClassificationSession {
    pub fn new(
        engine: SectionEngine,
        classifier: Arc<dyn DeviceClassifier>,
        rules: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            classifier,
            rules: rules.into(),
        }
    }

    /// Session whose engine and classifier all prompt the same provider.
    pub fn with_provider(ai_provider: Arc<dyn AIProvider>, rules: impl Into<String>) -> Self {
        Self::new(
            SectionEngine::with_provider(ai_provider.clone()),
            Arc::new(LlmDeviceClassifier::new(ai_provider)),
            rules,
        )
    }

    /// A fresh conversation opened with [`GREETING`].
    pub fn start(&self) -> Result<ConversationState, TurnError> {
        let mut state = ConversationState::new();
        state.push_message(Message::question(GREETING)?);
        Ok(state)
    }

    /// Processes one user utterance and returns the bot messages it produced.
    ///
    /// # Errors
    ///
    /// - `EmptyInput` for blank input; the state is left untouched
    /// - `Question` or `Classification` when the model call behind them
    ///   fails; deltas applied earlier in the turn are kept
    pub async fn process_turn(
        &self,
        state: &mut ConversationState,
        utterance: &str,
    ) -> Result<Vec<Message>, TurnError> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        state.push_message(Message::user(utterance)?);
        let first_reply = state.messages().len();

        loop {
            let next = route(state);
            tracing::debug!(route = %next, "Route decided");

            match next {
                Route::Halt => break,
                Route::Section(section) => {
                    let delta = self.engine.run(section, state).await?;
                    if delta.outcome == SectionOutcome::Skipped {
                        tracing::warn!(section = %section, "Routed to a section that had nothing to do");
                        break;
                    }
                    state.apply(delta)?;
                }
                Route::Classify => {
                    let report = self
                        .classifier
                        .classify(*state.id(), state.facts(), &self.rules)
                        .await
                        .map_err(TurnError::Classification)?;
                    tracing::info!(
                        device_class = ?report.device_class,
                        rules = ?report.rules,
                        "Device classified"
                    );
                    state.push_message(Message::report(report.text)?);
                    break;
                }
            }
        }

        Ok(state.messages()[first_reply..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::MessageKind;
    use crate::ports::CallPurpose;

    fn session(mock: &MockAIProvider) -> ClassificationSession {
        ClassificationSession::with_provider(Arc::new(mock.clone()), "Rule 1 ...")
    }

    #[test]
    fn starts_with_greeting_question() {
        let state = session(&MockAIProvider::new()).start().unwrap();

        assert_eq!(state.messages().len(), 1);
        assert!(state.messages()[0].is_question());
        assert_eq!(state.messages()[0].content(), GREETING);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_change() {
        let mock = MockAIProvider::new();
        let session = session(&mock);
        let mut state = session.start().unwrap();

        let err = session.process_turn(&mut state, "   ").await.unwrap_err();

        assert!(matches!(err, TurnError::EmptyInput));
        assert_eq!(state.messages().len(), 1);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn turn_stops_at_the_first_question() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(CallPurpose::Extraction, r#"{"device_name": "Scalpel"}"#)
            .with_response_for(CallPurpose::Question, "Does it enter the body?");
        let session = session(&mock);
        let mut state = session.start().unwrap();

        let replies = session.process_turn(&mut state, "A scalpel").await.unwrap();

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].content(), "Does it enter the body?");
        assert_eq!(state.facts().get("device_name").and_then(|v| v.as_text()), Some("Scalpel"));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn question_failure_keeps_state_before_the_turn() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(CallPurpose::Extraction, r#"{"device_name": "Scalpel"}"#)
            .with_error_for(CallPurpose::Question, MockError::AuthenticationFailed);
        let session = session(&mock);
        let mut state = session.start().unwrap();

        let err = session.process_turn(&mut state, "A scalpel").await.unwrap_err();

        assert!(matches!(err, TurnError::Question(_)));
        assert!(state.facts().is_empty());
        assert_eq!(state.messages().len(), 2);
        assert!(state.last_message().unwrap().is_user());
    }

    #[tokio::test]
    async fn completed_triage_continues_into_the_next_section() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(
                CallPurpose::Extraction,
                r#"{"device_name": "Wheelchair", "is_invasive": false, "is_active": false, "is_software": false}"#,
            )
            .with_response_for(
                CallPurpose::Question,
                "What is the main function of the wheelchair?",
            );
        let session = session(&mock);
        let mut state = session.start().unwrap();

        let replies = session
            .process_turn(&mut state, "A manual wheelchair, not powered")
            .await
            .unwrap();

        let kinds: Vec<MessageKind> = replies.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, vec![MessageKind::Status, MessageKind::Question]);
        assert!(state.triage_complete());
        assert_eq!(
            state.pending_sections().iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            vec!["non_invasive", "special_rules"]
        );
    }

    #[tokio::test]
    async fn classification_failure_is_reported() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(CallPurpose::Intent, "ANSWER")
            .with_response_for(
                CallPurpose::Extraction,
                r#"{"device_name": "Bandage", "is_invasive": false, "is_active": false, "is_software": false}"#,
            )
            .with_response_for(
                CallPurpose::Extraction,
                r#"{"non_invasive_function": "OTHER_NON_INVASIVE"}"#,
            )
            .with_response_for(CallPurpose::Extraction, r#"{"special_rules": ["NONE"]}"#)
            .with_error_for(CallPurpose::Classification, MockError::Timeout { timeout_secs: 60 });
        let session = session(&mock);
        let mut state = session.start().unwrap();

        session.process_turn(&mut state, "A plain bandage").await.unwrap();
        session.process_turn(&mut state, "other").await.unwrap();
        assert_eq!(
            state.facts().get("non_invasive_function").and_then(|v| v.as_text()),
            Some("OTHER_NON_INVASIVE")
        );
        let before = state.messages().len();
        let err = session.process_turn(&mut state, "none").await.unwrap_err();

        assert!(matches!(err, TurnError::Classification(_)));
        // Status for the finished section, no report.
        assert_eq!(state.messages().len(), before + 2);
        assert!(state.pending_sections().is_empty());
        assert!(!state.messages().iter().any(|m| m.kind() == MessageKind::Report));
    }
}
