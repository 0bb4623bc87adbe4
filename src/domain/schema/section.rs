//! Topic sections of the dialogue.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog;
use super::FieldDefinition;
use crate::domain::foundation::{StateMachine, ValidationError};

/// Identifier of a topic-scoped sub-flow.
///
/// Exactly one section, [`SectionId::Triage`], is the triage section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Triage,
    Invasive,
    NonInvasive,
    Active,
    Software,
    SpecialRules,
}

impl SectionId {
    pub const ALL: [SectionId; 6] = [
        SectionId::Triage,
        SectionId::Invasive,
        SectionId::NonInvasive,
        SectionId::Active,
        SectionId::Software,
        SectionId::SpecialRules,
    ];

    /// Wire name of the section.
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Triage => "triage",
            SectionId::Invasive => "invasive",
            SectionId::NonInvasive => "non_invasive",
            SectionId::Active => "active",
            SectionId::Software => "software",
            SectionId::SpecialRules => "special_rules",
        }
    }

    /// Returns true for the one always-run section.
    pub fn is_triage(&self) -> bool {
        matches!(self, SectionId::Triage)
    }

    /// Field schema of this section, in declaration order.
    pub fn fields(&self) -> &'static [FieldDefinition] {
        catalog::fields_of(*self)
    }

    /// Fixed status line emitted when the section completes.
    pub fn completion_message(&self) -> String {
        match self {
            SectionId::Triage => "Triage complete. Moving to specifics...".to_string(),
            other => format!("{} data collected.", other.as_str()),
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("section", format!("unknown section '{}'", s)))
    }
}

/// Lifecycle of a section within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// Not yet reached.
    #[default]
    Pending,
    /// A question from this section is outstanding.
    Active,
    /// All askable fields filled; never revisited.
    Complete,
}

impl StateMachine for SectionStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            // A section may complete on its first pass when the user has
            // already volunteered everything it needs.
            SectionStatus::Pending => vec![SectionStatus::Active, SectionStatus::Complete],
            SectionStatus::Active => vec![SectionStatus::Active, SectionStatus::Complete],
            SectionStatus::Complete => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_section_is_triage() {
        assert_eq!(SectionId::ALL.iter().filter(|s| s.is_triage()).count(), 1);
    }

    #[test]
    fn parses_wire_names() {
        for id in SectionId::ALL {
            assert_eq!(id.as_str().parse::<SectionId>().unwrap(), id);
        }
        assert!("classify".parse::<SectionId>().is_err());
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&SectionId::SpecialRules).unwrap();
        assert_eq!(json, "\"special_rules\"");
    }

    #[test]
    fn completion_messages_name_the_section() {
        assert_eq!(
            SectionId::Triage.completion_message(),
            "Triage complete. Moving to specifics..."
        );
        assert_eq!(SectionId::Invasive.completion_message(), "invasive data collected.");
    }

    #[test]
    fn every_section_has_fields() {
        for id in SectionId::ALL {
            assert!(!id.fields().is_empty(), "{} has no fields", id);
        }
    }

    mod status {
        use super::*;

        #[test]
        fn complete_is_terminal() {
            assert!(SectionStatus::Complete.is_terminal());
            assert!(SectionStatus::Complete
                .transition_to(SectionStatus::Active)
                .is_err());
        }

        #[test]
        fn active_may_ask_again() {
            assert_eq!(
                SectionStatus::Active.transition_to(SectionStatus::Active).unwrap(),
                SectionStatus::Active
            );
        }

        #[test]
        fn pending_may_complete_directly() {
            assert!(SectionStatus::Pending.can_transition_to(&SectionStatus::Complete));
        }

        #[test]
        fn nothing_returns_to_pending() {
            assert!(!SectionStatus::Active.can_transition_to(&SectionStatus::Pending));
        }
    }
}
