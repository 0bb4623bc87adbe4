//! Errors surfaced by a conversational turn.

use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::ports::OracleError;

/// Why a turn ended without finishing.
///
/// Intent and extraction failures never appear here; the section engine
/// recovers from them.
#[derive(Debug, Error)]
pub enum TurnError {
    /// Message content is empty or whitespace only.
    #[error("message cannot be empty")]
    EmptyInput,

    #[error("could not phrase the next question: {0}")]
    Question(#[source] OracleError),

    #[error("classification failed: {0}")]
    Classification(#[source] OracleError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
