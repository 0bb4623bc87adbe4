//! Field descriptors.
//!
//! A field is described once, as data: name, semantic type, the
//! human-readable description used verbatim when generating questions,
//! and an optional dependency on a prerequisite field.

use serde_json::{json, Value};

use super::FactValue;
use crate::domain::foundation::ValidationError;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Yes/no fact.
    Boolean,
    /// Free text (e.g. the device name).
    Text,
    /// Exactly one value from a closed set.
    Choice(&'static [&'static str]),
    /// Any number of values from a closed set.
    MultiChoice(&'static [&'static str]),
}

impl FieldType {
    /// Options for enumerated types, empty otherwise.
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FieldType::Choice(options) | FieldType::MultiChoice(options) => options,
            FieldType::Boolean | FieldType::Text => &[],
        }
    }

    /// Short name used in logs and prompts.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Text => "string",
            FieldType::Choice(_) => "enum",
            FieldType::MultiChoice(_) => "list of enum",
        }
    }
}

/// Value a prerequisite field must hold for a dependent field to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Is(bool),
    Equals(&'static str),
}

impl Requirement {
    /// Returns true if the prerequisite's value qualifies.
    pub fn is_met_by(&self, value: &FactValue) -> bool {
        match (self, value) {
            (Requirement::Is(expected), FactValue::Bool(actual)) => expected == actual,
            (Requirement::Equals(expected), FactValue::Text(actual)) => expected == actual,
            (Requirement::Equals(expected), FactValue::List(items)) => {
                items.iter().any(|i| i == expected)
            }
            _ => false,
        }
    }
}

/// Gate on another field: `parent` must be set and satisfy `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub parent: &'static str,
    pub required: Requirement,
}

/// Declarative description of one fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: &'static str,
    pub dependency: Option<Dependency>,
}

impl FieldDefinition {
    pub const fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::Boolean, description)
    }

    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::Text, description)
    }

    pub const fn choice(
        name: &'static str,
        options: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, FieldType::Choice(options), description)
    }

    pub const fn multi_choice(
        name: &'static str,
        options: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, FieldType::MultiChoice(options), description)
    }

    const fn new(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            description,
            dependency: None,
        }
    }

    /// Makes this field conditional on `parent` holding `required`.
    pub const fn when(mut self, parent: &'static str, required: Requirement) -> Self {
        self.dependency = Some(Dependency { parent, required });
        self
    }

    /// Coerces a raw extracted JSON value into this field's type.
    ///
    /// Booleans accept JSON booleans and yes/no/true/false strings.
    /// Enumerated values match case-insensitively with spaces and hyphens
    /// read as underscores, and are stored in their canonical spelling.
    /// A list is rejected as a whole if any element is outside the set.
    pub fn coerce(&self, raw: &Value) -> Result<FactValue, ValidationError> {
        match self.field_type {
            FieldType::Boolean => match raw {
                Value::Bool(b) => Ok(FactValue::Bool(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "y" => Ok(FactValue::Bool(true)),
                    "false" | "no" | "n" => Ok(FactValue::Bool(false)),
                    _ => Err(ValidationError::invalid_format(self.name, "expected yes or no")),
                },
                _ => Err(ValidationError::invalid_format(self.name, "expected a boolean")),
            },
            FieldType::Text => match raw {
                Value::String(s) if !s.trim().is_empty() => Ok(FactValue::Text(s.trim().to_string())),
                Value::String(_) => Err(ValidationError::empty_field(self.name)),
                _ => Err(ValidationError::invalid_format(self.name, "expected a string")),
            },
            FieldType::Choice(options) => match raw {
                Value::String(s) => canonical_option(options, s)
                    .map(|o| FactValue::Text(o.to_string()))
                    .ok_or_else(|| ValidationError::not_allowed(self.name, s.as_str(), options)),
                _ => Err(ValidationError::invalid_format(self.name, "expected one option")),
            },
            FieldType::MultiChoice(options) => {
                let items: Vec<&Value> = match raw {
                    Value::Array(items) => items.iter().collect(),
                    // A lone string is a one-element selection.
                    Value::String(_) => vec![raw],
                    _ => {
                        return Err(ValidationError::invalid_format(
                            self.name,
                            "expected a list of options",
                        ))
                    }
                };
                let mut selected = Vec::with_capacity(items.len());
                for item in items {
                    let text = item.as_str().ok_or_else(|| {
                        ValidationError::invalid_format(self.name, "list items must be strings")
                    })?;
                    let option = canonical_option(options, text)
                        .ok_or_else(|| ValidationError::not_allowed(self.name, text, options))?;
                    if !selected.iter().any(|s: &String| s == option) {
                        selected.push(option.to_string());
                    }
                }
                Ok(FactValue::List(selected))
            }
        }
    }

    /// JSON-schema fragment for structured extraction. Every field is nullable.
    pub fn json_schema(&self) -> Value {
        match self.field_type {
            FieldType::Boolean => json!({
                "type": ["boolean", "null"],
                "description": self.description,
            }),
            FieldType::Text => json!({
                "type": ["string", "null"],
                "description": self.description,
            }),
            FieldType::Choice(options) => json!({
                "type": ["string", "null"],
                "enum": options.iter().map(|o| Value::String(o.to_string()))
                    .chain(std::iter::once(Value::Null))
                    .collect::<Vec<_>>(),
                "description": self.description,
            }),
            FieldType::MultiChoice(options) => json!({
                "type": ["array", "null"],
                "items": { "type": "string", "enum": options },
                "description": self.description,
            }),
        }
    }
}

fn canonical_option(options: &'static [&'static str], raw: &str) -> Option<&'static str> {
    let normalized: String = raw
        .trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();
    options
        .iter()
        .copied()
        .find(|o| o.eq_ignore_ascii_case(&normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: &[&str] = &["SMALL", "LARGE_BOX"];

    mod coerce {
        use super::*;

        #[test]
        fn boolean_accepts_json_and_yes_no() {
            let field = FieldDefinition::boolean("is_active", "Is it active?");
            assert_eq!(field.coerce(&json!(true)).unwrap(), FactValue::Bool(true));
            assert_eq!(field.coerce(&json!("No")).unwrap(), FactValue::Bool(false));
            assert_eq!(field.coerce(&json!("yes")).unwrap(), FactValue::Bool(true));
        }

        #[test]
        fn boolean_rejects_other_strings() {
            let field = FieldDefinition::boolean("is_active", "Is it active?");
            assert!(field.coerce(&json!("sometimes")).is_err());
            assert!(field.coerce(&json!(1)).is_err());
        }

        #[test]
        fn choice_normalizes_case_and_separators() {
            let field = FieldDefinition::choice("size", SIZES, "Size");
            assert_eq!(field.coerce(&json!("large box")).unwrap(), FactValue::from("LARGE_BOX"));
            assert_eq!(field.coerce(&json!("large-box")).unwrap(), FactValue::from("LARGE_BOX"));
            assert_eq!(field.coerce(&json!("small")).unwrap(), FactValue::from("SMALL"));
        }

        #[test]
        fn choice_rejects_value_outside_set() {
            let field = FieldDefinition::choice("size", SIZES, "Size");
            let err = field.coerce(&json!("MEDIUM")).unwrap_err();
            assert!(matches!(err, ValidationError::NotAllowed { .. }));
        }

        #[test]
        fn multi_choice_rejects_whole_list_on_bad_item() {
            let field = FieldDefinition::multi_choice("sizes", SIZES, "Sizes");
            assert!(field.coerce(&json!(["SMALL", "HUGE"])).is_err());
        }

        #[test]
        fn multi_choice_deduplicates_and_accepts_single_string() {
            let field = FieldDefinition::multi_choice("sizes", SIZES, "Sizes");
            assert_eq!(
                field.coerce(&json!(["small", "SMALL", "large box"])).unwrap(),
                FactValue::List(vec!["SMALL".into(), "LARGE_BOX".into()])
            );
            assert_eq!(
                field.coerce(&json!("small")).unwrap(),
                FactValue::List(vec!["SMALL".into()])
            );
        }

        #[test]
        fn multi_choice_keeps_empty_list() {
            let field = FieldDefinition::multi_choice("sizes", SIZES, "Sizes");
            assert_eq!(field.coerce(&json!([])).unwrap(), FactValue::List(vec![]));
        }

        #[test]
        fn text_trims_and_rejects_blank() {
            let field = FieldDefinition::text("device_name", "Name");
            assert_eq!(field.coerce(&json!("  scalpel ")).unwrap(), FactValue::from("scalpel"));
            assert!(field.coerce(&json!("   ")).is_err());
        }
    }

    mod requirement {
        use super::*;

        #[test]
        fn boolean_requirement_matches_only_equal_bool() {
            assert!(Requirement::Is(true).is_met_by(&FactValue::Bool(true)));
            assert!(!Requirement::Is(true).is_met_by(&FactValue::Bool(false)));
            assert!(!Requirement::Is(true).is_met_by(&FactValue::from("true")));
        }

        #[test]
        fn equals_requirement_matches_text_and_list_membership() {
            assert!(Requirement::Equals("SMALL").is_met_by(&FactValue::from("SMALL")));
            assert!(Requirement::Equals("SMALL")
                .is_met_by(&FactValue::List(vec!["LARGE_BOX".into(), "SMALL".into()])));
            assert!(!Requirement::Equals("SMALL").is_met_by(&FactValue::from("LARGE_BOX")));
        }
    }

    #[test]
    fn when_attaches_dependency() {
        let field = FieldDefinition::boolean("child", "c").when("parent", Requirement::Is(false));
        assert_eq!(
            field.dependency,
            Some(Dependency {
                parent: "parent",
                required: Requirement::Is(false)
            })
        );
    }

    #[test]
    fn json_schema_is_nullable_and_lists_options() {
        let field = FieldDefinition::choice("size", SIZES, "Size");
        let schema = field.json_schema();
        assert_eq!(schema["type"], json!(["string", "null"]));
        assert_eq!(schema["enum"], json!(["SMALL", "LARGE_BOX", null]));
        assert_eq!(schema["description"], json!("Size"));
    }
}
