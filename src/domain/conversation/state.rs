//! The conversation aggregate and the deltas that mutate it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use super::Message;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, StateMachine};
use crate::domain::schema::{FactSet, SectionId, SectionStatus};

/// What a section engine call decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    /// Nothing to do (triage re-entry).
    Skipped,
    /// The user asked about the last question; it was explained.
    Clarified,
    /// A question about `field` was asked.
    Asked { field: &'static str },
    /// Every askable field is filled. Triage carries the planned queue.
    Completed { schedule: Option<VecDeque<SectionId>> },
}

/// Changes produced by one section engine call.
///
/// Components never mutate the conversation directly; the session loop
/// applies deltas one at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionDelta {
    pub section: SectionId,
    pub fact_updates: FactSet,
    pub message: Option<Message>,
    pub outcome: SectionOutcome,
}

impl SectionDelta {
    /// A delta that changes nothing.
    pub fn skipped(section: SectionId) -> Self {
        Self {
            section,
            fact_updates: FactSet::new(),
            message: None,
            outcome: SectionOutcome::Skipped,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.fact_updates.is_empty() && self.message.is_none()
    }
}

/// The single mutable aggregate of a classification session.
///
/// # Invariants
///
/// - `messages` is append-only
/// - `triage_complete` flips from false to true exactly once
/// - `pending_sections` is filled once, when triage completes, and then
///   only shrinks from the front
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    id: SessionId,
    messages: Vec<Message>,
    facts: FactSet,
    pending_sections: VecDeque<SectionId>,
    triage_complete: bool,
    section_status: BTreeMap<SectionId, SectionStatus>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
            facts: FactSet::new(),
            pending_sections: VecDeque::new(),
            triage_complete: false,
            section_status: BTreeMap::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn facts(&self) -> &FactSet {
        &self.facts
    }

    pub fn pending_sections(&self) -> &VecDeque<SectionId> {
        &self.pending_sections
    }

    pub fn triage_complete(&self) -> bool {
        self.triage_complete
    }

    pub fn section_status(&self, section: SectionId) -> SectionStatus {
        self.section_status.get(&section).copied().unwrap_or_default()
    }

    /// Content of the question the latest user message answers.
    ///
    /// Looks at the nearest assistant message before the latest user
    /// message; `None` unless that message is a question.
    pub fn last_bot_question(&self) -> Option<&str> {
        let last_user = self.messages.iter().rposition(Message::is_user)?;
        self.messages[..last_user]
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .filter(|m| m.is_question())
            .map(Message::content)
    }

    /// Content of the most recent message if it came from the user.
    pub fn pending_user_utterance(&self) -> Option<&str> {
        self.last_message()
            .filter(|m| m.is_user())
            .map(Message::content)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Appends a message without touching anything else.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Applies a section delta.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the section is already complete
    /// - `SectionNotPending` if a non-triage section completes out of order
    /// - `ValidationFailed` if triage completes without a schedule
    pub fn apply(&mut self, delta: SectionDelta) -> Result<(), DomainError> {
        let section = delta.section;
        let current = self.section_status(section);

        let next = match &delta.outcome {
            SectionOutcome::Skipped => None,
            SectionOutcome::Clarified | SectionOutcome::Asked { .. } => {
                Some(current.transition_to(SectionStatus::Active)?)
            }
            SectionOutcome::Completed { .. } => {
                Some(current.transition_to(SectionStatus::Complete)?)
            }
        };

        if let SectionOutcome::Completed { schedule } = &delta.outcome {
            if section.is_triage() {
                let schedule = schedule.clone().ok_or_else(|| {
                    DomainError::validation("schedule", "Triage completed without a schedule")
                })?;
                self.pending_sections = schedule;
                self.triage_complete = true;
            } else {
                if self.pending_sections.front() != Some(&section) {
                    return Err(DomainError::new(
                        ErrorCode::SectionNotPending,
                        format!("Section {} is not at the front of the queue", section),
                    ));
                }
                self.pending_sections.pop_front();
            }
        }

        if let Some(status) = next {
            self.section_status.insert(section, status);
        }
        self.facts.merge(delta.fact_updates);
        if let Some(message) = delta.message {
            self.messages.push(message);
        }
        Ok(())
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
