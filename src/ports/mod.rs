//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - the external language model
//! - `IntentClassifier`, `FactExtractor`, `QuestionGenerator`,
//!   `DeviceClassifier` - the dialogue oracles built on top of it
//! - `RulesSource` - the classification rule text

mod ai_provider;
mod dialogue;
mod rules_source;

pub use ai_provider::{
    AIError, AIProvider, CallPurpose, CompletionRequest, CompletionResponse, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, ResponseSchema, TokenUsage,
};
pub use dialogue::{
    DeviceClassifier, Exchange, FactExtractor, Intent, IntentClassifier, OracleError,
    QuestionGenerator,
};
pub use rules_source::{RulesError, RulesSource};
