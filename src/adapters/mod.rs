//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Language-model providers (OpenAI-compatible, Anthropic, mock, pacing)
//! - `dialogue` - Dialogue oracles built on an AI provider
//! - `rules` - Rule text sources (file)

pub mod ai;
pub mod dialogue;
pub mod rules;

pub use ai::{
    AnthropicConfig, AnthropicProvider, MockAIProvider, MockError, MockResponse, OpenAIConfig,
    OpenAIProvider, PacedAIProvider,
};
pub use dialogue::{
    LlmDeviceClassifier, LlmFactExtractor, LlmIntentClassifier, LlmQuestionGenerator,
};
pub use rules::FileRulesSource;
