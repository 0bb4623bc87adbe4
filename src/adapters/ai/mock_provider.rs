//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing the dialogue to be driven without calling a real model.
//!
//! # Features
//!
//! - Pre-configured responses, either in one queue or per [`CallPurpose`]
//! - Simulated delays for pacing tests
//! - Error injection for recovery tests
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response_for(CallPurpose::Intent, "ANSWER")
//!     .with_response_for(CallPurpose::Extraction, r#"{"is_invasive": true}"#);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CallPurpose, CompletionRequest, CompletionResponse, FinishReason,
    ProviderInfo, TokenUsage,
};

const DEFAULT_CONTENT: &str = "Mock response";

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Responses consumed in order by calls with no purpose-specific queue.
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Responses consumed in order by calls of one purpose.
    by_purpose: Arc<Mutex<HashMap<CallPurpose, VecDeque<MockResponse>>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
    Parse { message: String },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
            MockError::Parse { message } => AIError::parse(message),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            by_purpose: Arc::new(Mutex::new(HashMap::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the shared queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        });
        self
    }

    /// Adds an error response to the shared queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Adds a successful response for calls of one purpose.
    pub fn with_response_for(self, purpose: CallPurpose, content: impl Into<String>) -> Self {
        self.push_for(
            purpose,
            MockResponse::Success {
                content: content.into(),
                finish_reason: FinishReason::Stop,
            },
        )
    }

    /// Adds an error response for calls of one purpose.
    pub fn with_error_for(self, purpose: CallPurpose, error: MockError) -> Self {
        self.push_for(purpose, MockResponse::Error(error))
    }

    fn push_for(self, purpose: CallPurpose, response: MockResponse) -> Self {
        lock(&self.by_purpose)
            .entry(purpose)
            .or_default()
            .push_back(response);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// Purposes of all recorded calls, in order.
    pub fn call_purposes(&self) -> Vec<CallPurpose> {
        lock(&self.calls).iter().map(|c| c.metadata.purpose).collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Gets the next response for `purpose`, falling back to the shared
    /// queue and then to a default.
    fn next_response(&self, purpose: CallPurpose) -> MockResponse {
        let targeted = lock(&self.by_purpose)
            .get_mut(&purpose)
            .and_then(VecDeque::pop_front);
        targeted
            .or_else(|| lock(&self.responses).pop_front())
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_CONTENT.to_string(),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let purpose = request.metadata.purpose;
        let prompt_tokens = request
            .messages
            .iter()
            .map(|m| m.content.split_whitespace().count() as u32)
            .sum();
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(purpose) {
            MockResponse::Success {
                content,
                finish_reason,
            } => {
                let completion_tokens = content.split_whitespace().count() as u32;
                Ok(CompletionResponse {
                    content,
                    usage: TokenUsage::new(prompt_tokens, completion_tokens),
                    model: self.info.model.clone(),
                    finish_reason,
                })
            }
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::ports::{MessageRole, RequestMetadata};

    fn request(purpose: CallPurpose) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(SessionId::new(), purpose))
            .with_message(MessageRole::User, "Hello there")
    }

    #[tokio::test]
    async fn returns_shared_responses_in_order() {
        let provider = MockAIProvider::new().with_response("First").with_response("Second");

        let r1 = provider.complete(request(CallPurpose::Intent)).await.unwrap();
        let r2 = provider.complete(request(CallPurpose::Question)).await.unwrap();

        assert_eq!(r1.content, "First");
        assert_eq!(r2.content, "Second");
        assert_eq!(r1.model, "mock-model-1");
    }

    #[tokio::test]
    async fn purpose_queues_take_precedence() {
        let provider = MockAIProvider::new()
            .with_response("shared")
            .with_response_for(CallPurpose::Intent, "ANSWER");

        let question = provider.complete(request(CallPurpose::Question)).await.unwrap();
        let intent = provider.complete(request(CallPurpose::Intent)).await.unwrap();

        assert_eq!(question.content, "shared");
        assert_eq!(intent.content, "ANSWER");
    }

    #[tokio::test]
    async fn returns_default_after_exhausted() {
        let provider = MockAIProvider::new().with_response("Only one");

        provider.complete(request(CallPurpose::Intent)).await.unwrap();
        let r2 = provider.complete(request(CallPurpose::Intent)).await.unwrap();

        assert_eq!(r2.content, DEFAULT_CONTENT);
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockAIProvider::new()
            .with_error_for(CallPurpose::Extraction, MockError::Timeout { timeout_secs: 5 });

        let err = provider
            .complete(request(CallPurpose::Extraction))
            .await
            .unwrap_err();

        assert!(matches!(err, AIError::Timeout { timeout_secs: 5 }));
    }

    #[tokio::test]
    async fn tracks_calls_and_purposes() {
        let provider = MockAIProvider::new();

        provider.complete(request(CallPurpose::Intent)).await.unwrap();
        provider.complete(request(CallPurpose::Extraction)).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            provider.call_purposes(),
            vec![CallPurpose::Intent, CallPurpose::Extraction]
        );
        assert_eq!(provider.get_calls()[0].last_user_content(), Some("Hello there"));

        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn reports_word_counts_as_usage() {
        let provider = MockAIProvider::new().with_response("one two three");
        let response = provider.complete(request(CallPurpose::Question)).await.unwrap();
        assert_eq!(response.usage, TokenUsage::new(2, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn respects_delay() {
        let provider = MockAIProvider::new().with_delay(Duration::from_millis(50));

        let start = tokio::time::Instant::now();
        provider.complete(request(CallPurpose::Intent)).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn mock_error_converts_to_ai_error() {
        let err: AIError = MockError::AuthenticationFailed.into();
        assert!(matches!(err, AIError::AuthenticationFailed));

        let err: AIError = MockError::Parse { message: "bad".into() }.into();
        assert!(matches!(err, AIError::Parse(_)));
    }
}
