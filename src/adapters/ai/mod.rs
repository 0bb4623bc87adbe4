//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing
//! - `OpenAIProvider` - OpenAI-compatible chat completions (OpenAI, Gemini)
//! - `AnthropicProvider` - Anthropic Messages API
//! - `PacedAIProvider` - Wrapper enforcing a minimum interval between calls

mod anthropic_provider;
mod mock_provider;
mod openai_provider;
mod paced_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use paced_provider::{PacedAIProvider};
