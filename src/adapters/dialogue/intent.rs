//! LLM-backed intent classification.

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{
    AIProvider, CallPurpose, CompletionRequest, Exchange, Intent, IntentClassifier, MessageRole,
    OracleError, RequestMetadata,
};

const MAX_TOKENS: u32 = 16;

/// Asks the model whether an utterance answers the last question.
pub struct LlmIntentClassifier {
    ai_provider: Arc<dyn AIProvider>,
}

impl LlmIntentClassifier {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    fn create_prompt(exchange: &Exchange<'_>) -> String {
        format!(
            r#"Analyze the conversation.
Bot asked: "{}"
User replied: "{}"

Task: Determine if the User is answering the question OR asking for help/clarification.

Return ONLY one word:
- ANSWER (if the user provides information, says yes/no, or ignores the question)
- CLARIFICATION (if the user asks "what do you mean?", "I don't understand", "define X")"#,
            exchange.last_question_or_none(),
            exchange.utterance
        )
    }

    /// Reads the one-word verdict. Clarification wins if both words appear.
    fn parse_intent(response: &str) -> Result<Intent, OracleError> {
        let verdict = response.trim().to_ascii_uppercase();
        if verdict.contains("CLARIFICATION") {
            Ok(Intent::Clarification)
        } else if verdict.contains("ANSWER") {
            Ok(Intent::Answer)
        } else {
            Err(OracleError::Unrecognized(response.trim().to_string()))
        }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify_intent(&self, exchange: Exchange<'_>) -> Result<Intent, OracleError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            exchange.session_id,
            CallPurpose::Intent,
        ))
        .with_message(MessageRole::User, Self::create_prompt(&exchange))
        .with_temperature(0.0)
        .with_max_tokens(MAX_TOKENS);

        let response = self.ai_provider.complete(request).await?;
        Self::parse_intent(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::foundation::SessionId;

    fn exchange<'a>(question: Option<&'a str>, utterance: &'a str) -> Exchange<'a> {
        Exchange {
            session_id: SessionId::new(),
            last_question: question,
            utterance,
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn reads_answer() {
            assert_eq!(LlmIntentClassifier::parse_intent("ANSWER").unwrap(), Intent::Answer);
            assert_eq!(LlmIntentClassifier::parse_intent(" answer.\n").unwrap(), Intent::Answer);
        }

        #[test]
        fn reads_clarification() {
            assert_eq!(
                LlmIntentClassifier::parse_intent("Clarification").unwrap(),
                Intent::Clarification
            );
        }

        #[test]
        fn rejects_other_output() {
            let err = LlmIntentClassifier::parse_intent("maybe").unwrap_err();
            assert!(matches!(err, OracleError::Unrecognized(ref s) if s == "maybe"));
        }
    }

    #[tokio::test]
    async fn prompt_carries_question_and_reply() {
        let mock = MockAIProvider::new().with_response_for(CallPurpose::Intent, "CLARIFICATION");
        let classifier = LlmIntentClassifier::new(Arc::new(mock.clone()));

        let intent = classifier
            .classify_intent(exchange(
                Some("Is the device surgically invasive?"),
                "what do you mean by surgically invasive?",
            ))
            .await
            .unwrap();

        assert_eq!(intent, Intent::Clarification);
        let calls = mock.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, Some(0.0));
        let prompt = calls[0].last_user_content().unwrap();
        assert!(prompt.contains("Bot asked: \"Is the device surgically invasive?\""));
        assert!(prompt.contains("what do you mean by surgically invasive?"));
    }

    #[tokio::test]
    async fn missing_question_is_rendered_as_none() {
        let mock = MockAIProvider::new().with_response_for(CallPurpose::Intent, "ANSWER");
        let classifier = LlmIntentClassifier::new(Arc::new(mock.clone()));

        classifier
            .classify_intent(exchange(None, "A reusable scalpel"))
            .await
            .unwrap();

        let calls = mock.get_calls();
        assert!(calls[0].last_user_content().unwrap().contains("Bot asked: \"None\""));
    }

    #[tokio::test]
    async fn provider_failure_is_returned() {
        let mock = MockAIProvider::new()
            .with_error_for(CallPurpose::Intent, MockError::Timeout { timeout_secs: 30 });
        let classifier = LlmIntentClassifier::new(Arc::new(mock));

        let err = classifier
            .classify_intent(exchange(None, "hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::Provider(_)));
    }
}
