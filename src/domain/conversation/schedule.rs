//! Section scheduling after triage.

use std::collections::VecDeque;

use crate::domain::schema::{FactSet, SectionId};

/// Builds the pending-sections queue from triage facts.
///
/// Invasiveness picks invasive or non-invasive (neither when unknown),
/// then active, then software. Special rules always run last because they
/// can override any class.
pub fn plan_sections(facts: &FactSet) -> VecDeque<SectionId> {
    let mut queue = VecDeque::with_capacity(4);

    match facts.flag("is_invasive") {
        Some(true) => queue.push_back(SectionId::Invasive),
        Some(false) => queue.push_back(SectionId::NonInvasive),
        None => {}
    }
    if facts.flag("is_active") == Some(true) {
        queue.push_back(SectionId::Active);
    }
    if facts.flag("is_software") == Some(true) {
        queue.push_back(SectionId::Software);
    }
    queue.push_back(SectionId::SpecialRules);

    queue
}
