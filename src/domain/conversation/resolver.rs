//! Conditional field resolution.
//!
//! Decides, from the current facts alone, whether a field should be asked
//! about now, later, or never.

use crate::domain::schema::{FactSet, FieldDefinition};

/// Where a field stands with respect to the current facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Askability {
    /// Unset, and either ungated or its gate is open.
    Askable,
    /// Already has a value.
    Answered,
    /// Gated on a prerequisite that is still unknown.
    AwaitingPrerequisite,
    /// Gated on a prerequisite that holds a disqualifying value.
    NotApplicable,
}

impl Askability {
    pub fn is_askable(&self) -> bool {
        matches!(self, Askability::Askable)
    }
}

/// Classifies `field` against `facts`.
///
/// A list-valued field counts as answered as soon as it holds any list,
/// including an empty one.
pub fn askability(field: &FieldDefinition, facts: &FactSet) -> Askability {
    if facts.is_known(field.name) {
        return Askability::Answered;
    }
    let Some(dependency) = field.dependency else {
        return Askability::Askable;
    };
    match facts.get(dependency.parent) {
        None => Askability::AwaitingPrerequisite,
        Some(value) if dependency.required.is_met_by(value) => Askability::Askable,
        Some(_) => Askability::NotApplicable,
    }
}

/// Returns true if `field` is unset and may be asked about now.
pub fn is_askable(field: &FieldDefinition, facts: &FactSet) -> bool {
    askability(field, facts).is_askable()
}

/// First askable field in declaration order.
pub fn next_missing_field<'a>(
    fields: &'a [FieldDefinition],
    facts: &FactSet,
) -> Option<&'a FieldDefinition> {
    fields.iter().find(|f| is_askable(f, facts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{catalog, FactValue, SectionId};
    use proptest::prelude::*;

    fn field(name: &str) -> &'static FieldDefinition {
        catalog::lookup(name).unwrap().definition
    }

    mod askability {
        use super::*;

        #[test]
        fn ungated_unset_field_is_askable() {
            assert_eq!(askability(field("is_invasive"), &FactSet::new()), Askability::Askable);
        }

        #[test]
        fn set_field_is_answered() {
            let mut facts = FactSet::new();
            facts.set("is_invasive", FactValue::Bool(false));
            assert_eq!(askability(field("is_invasive"), &facts), Askability::Answered);
        }

        #[test]
        fn gated_field_waits_for_its_prerequisite() {
            assert_eq!(
                askability(field("orifice_location"), &FactSet::new()),
                Askability::AwaitingPrerequisite
            );
        }

        #[test]
        fn gated_field_opens_on_required_value() {
            let mut facts = FactSet::new();
            facts.set("is_surgically_invasive", FactValue::Bool(false));
            assert_eq!(askability(field("orifice_location"), &facts), Askability::Askable);
        }

        #[test]
        fn gated_field_is_skipped_on_other_value() {
            let mut facts = FactSet::new();
            facts.set("is_surgically_invasive", FactValue::Bool(true));
            assert_eq!(askability(field("orifice_location"), &facts), Askability::NotApplicable);
        }

        #[test]
        fn enum_gate_compares_option() {
            let mut facts = FactSet::new();
            facts.set("active_function", FactValue::from("DIAGNOSTIC_OR_MONITORING"));
            assert!(is_askable(field("monitors_vital_parameters"), &facts));
            assert!(!is_askable(field("energy_potentially_hazardous"), &facts));
        }

        #[test]
        fn empty_list_counts_as_answered() {
            let mut facts = FactSet::new();
            facts.set("special_rules", FactValue::List(vec![]));
            assert_eq!(askability(field("special_rules"), &facts), Askability::Answered);
        }
    }

    mod next_missing {
        use super::*;

        #[test]
        fn follows_declaration_order() {
            let fields = SectionId::Triage.fields();
            let mut facts = FactSet::new();
            assert_eq!(next_missing_field(fields, &facts).unwrap().name, "device_name");

            facts.set("device_name", FactValue::from("scalpel"));
            facts.set("is_invasive", FactValue::Bool(true));
            assert_eq!(next_missing_field(fields, &facts).unwrap().name, "duration");
        }

        #[test]
        fn skips_closed_gates() {
            let fields = SectionId::Triage.fields();
            let mut facts = FactSet::new();
            facts.set("device_name", FactValue::from("bandage"));
            facts.set("is_invasive", FactValue::Bool(false));
            assert_eq!(next_missing_field(fields, &facts).unwrap().name, "is_active");
        }

        #[test]
        fn surgical_path_never_reaches_orifice_questions() {
            let fields = SectionId::Invasive.fields();
            let mut facts = FactSet::new();
            facts.set("is_surgically_invasive", FactValue::Bool(true));
            let mut asked = Vec::new();
            while let Some(next) = next_missing_field(fields, &facts) {
                asked.push(next.name);
                facts.set(next.name, FactValue::Bool(false));
            }
            assert!(!asked.contains(&"orifice_location"));
            assert!(!asked.contains(&"connected_to_active_device"));
            assert!(asked.contains(&"is_implantable"));
            // is_implantable=false closes the implant questions
            assert!(!asked.contains(&"breast_implant_or_mesh"));
        }

        #[test]
        fn none_when_section_is_satisfied() {
            let fields = SectionId::NonInvasive.fields();
            let mut facts = FactSet::new();
            facts.set("non_invasive_function", FactValue::from("BLOOD_BAG"));
            assert!(next_missing_field(fields, &facts).is_none());
        }
    }

    fn arb_value() -> impl Strategy<Value = Option<FactValue>> {
        prop_oneof![
            Just(None),
            any::<bool>().prop_map(|b| Some(FactValue::Bool(b))),
            proptest::sample::select(catalog::ACTIVE_FUNCTIONS)
                .prop_map(|o| Some(FactValue::from(o))),
            proptest::sample::select(catalog::NON_INVASIVE_FUNCTIONS)
                .prop_map(|o| Some(FactValue::from(o))),
        ]
    }

    fn arb_facts() -> impl Strategy<Value = FactSet> {
        let names: Vec<&'static str> = catalog::all_fields().map(|f| f.name).collect();
        proptest::collection::vec(arb_value(), names.len()).prop_map(move |values| {
            names
                .iter()
                .zip(values)
                .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn gated_fields_are_never_missing_without_qualifying_parent(facts in arb_facts()) {
            for section in SectionId::ALL {
                if let Some(next) = next_missing_field(section.fields(), &facts) {
                    prop_assert!(!facts.is_known(next.name));
                    if let Some(dep) = next.dependency {
                        let parent = facts.get(dep.parent);
                        prop_assert!(parent.is_some());
                        prop_assert!(dep.required.is_met_by(parent.unwrap()));
                    }
                }
            }
        }
    }
}
