//! Source of the classification rule text.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rules text not found at {0}")]
    NotFound(String),

    #[error("failed to read rules text: {0}")]
    Io(String),
}

/// Loads the authoritative rule text. The text is opaque to the engine.
#[async_trait]
pub trait RulesSource: Send + Sync {
    async fn load(&self) -> Result<String, RulesError>;
}
