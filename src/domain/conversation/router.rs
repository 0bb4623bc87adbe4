//! Section routing.
//!
//! Picks what runs next from the conversation state. The decision reads
//! message kinds only, never message text.

use super::ConversationState;
use crate::domain::schema::SectionId;
use std::fmt;

/// Next step of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// A question is outstanding; wait for the user.
    Halt,
    /// Run the section engine for this section.
    Section(SectionId),
    /// Every section is done; produce the report.
    Classify,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Halt => write!(f, "halt"),
            Route::Section(section) => write!(f, "section:{}", section),
            Route::Classify => write!(f, "classify"),
        }
    }
}

/// Decides the next step.
///
/// 1. An unanswered bot question halts, whatever else holds.
/// 2. Triage runs until it completes.
/// 3. Then the front of the pending queue.
/// 4. Then classification.
pub fn route(state: &ConversationState) -> Route {
    if state.last_message().is_some_and(|m| m.is_question()) {
        return Route::Halt;
    }
    if !state.triage_complete() {
        return Route::Section(SectionId::Triage);
    }
    match state.pending_sections().front() {
        Some(section) => Route::Section(*section),
        None => Route::Classify,
    }
}
