//! AI provider configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Longest allowed spacing between model calls.
const MAX_CALL_INTERVAL_MS: u64 = 60_000;

/// Environment variable the OpenAI key is loaded from.
pub const OPENAI_API_KEY_ENV: &str = "MDR_CLASSIFIER__AI__OPENAI_API_KEY";

/// Environment variable the Anthropic key is loaded from.
pub const ANTHROPIC_API_KEY_ENV: &str = "MDR_CLASSIFIER__AI__ANTHROPIC_API_KEY";

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Which provider serves every model call
    #[serde(default)]
    pub provider: AiProvider,

    /// OpenAI (or OpenAI-compatible) API key
    pub openai_api_key: Option<Secret<String>>,

    /// Anthropic API key
    pub anthropic_api_key: Option<Secret<String>>,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// Base URL override, e.g. an OpenAI-compatible Gemini endpoint
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Minimum spacing between the start of consecutive model calls
    #[serde(default = "default_min_call_interval")]
    pub min_call_interval_ms: u64,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl std::str::FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAI),
            "anthropic" => Ok(AiProvider::Anthropic),
            other => Err(format!("unknown provider '{}' (expected openai or anthropic)", other)),
        }
    }
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_call_interval(&self) -> Duration {
        Duration::from_millis(self.min_call_interval_ms)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        has_key(&self.openai_api_key)
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        has_key(&self.anthropic_api_key)
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.provider {
            AiProvider::OpenAI if !self.has_openai() => {
                return Err(ValidationError::MissingRequired(OPENAI_API_KEY_ENV));
            }
            AiProvider::Anthropic if !self.has_anthropic() => {
                return Err(ValidationError::MissingRequired(ANTHROPIC_API_KEY_ENV));
            }
            _ => {}
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.min_call_interval_ms > MAX_CALL_INTERVAL_MS {
            return Err(ValidationError::CallIntervalTooLong);
        }

        Ok(())
    }
}

fn has_key(key: &Option<Secret<String>>) -> bool {
    use secrecy::ExposeSecret;
    key.as_ref().is_some_and(|k| !k.expose_secret().is_empty())
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            anthropic_api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
            min_call_interval_ms: default_min_call_interval(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

fn default_min_call_interval() -> u64 {
    1000
}
