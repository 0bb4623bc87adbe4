//! Classification report parsing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MDR risk class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceClass {
    #[serde(rename = "I")]
    I,
    #[serde(rename = "IIa")]
    IIa,
    #[serde(rename = "IIb")]
    IIb,
    #[serde(rename = "III")]
    III,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 4] = [
        DeviceClass::I,
        DeviceClass::IIa,
        DeviceClass::IIb,
        DeviceClass::III,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeviceClass::I => "I",
            DeviceClass::IIa => "IIa",
            DeviceClass::IIb => "IIb",
            DeviceClass::III => "III",
        }
    }

    fn parse_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class {}", self.label())
    }
}

/// The classifier's free-text report plus what could be read out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub text: String,
    /// Set only when the text names exactly one class.
    pub device_class: Option<DeviceClass>,
    /// Cited rule numbers in order of first mention.
    pub rules: Vec<u8>,
}

impl ClassificationReport {
    /// Reads the class and the rule citations out of report text.
    ///
    /// A class is the token after `Class`; a rule is the number after
    /// `Rule` or `Rules` (`Rules 5, 6` cites both).
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens: Vec<&str> = text
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let mut classes: Vec<DeviceClass> = Vec::new();
        let mut rules: Vec<u8> = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if token.eq_ignore_ascii_case("class") {
                if let Some(class) = tokens.get(i + 1).and_then(|t| DeviceClass::parse_token(t)) {
                    if !classes.contains(&class) {
                        classes.push(class);
                    }
                }
            } else if token.eq_ignore_ascii_case("rule") || token.eq_ignore_ascii_case("rules") {
                // `and` continues a list; 0 marks it and is dropped.
                let numbers = tokens[i + 1..]
                    .iter()
                    .map_while(|t| match t.parse::<u8>() {
                        Ok(n) => Some(n),
                        Err(_) if t.eq_ignore_ascii_case("and") => Some(0),
                        Err(_) => None,
                    })
                    .filter(|n| *n != 0);
                for number in numbers {
                    if !rules.contains(&number) {
                        rules.push(number);
                    }
                }
            }
        }

        let device_class = match classes.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        Self {
            text,
            device_class,
            rules,
        }
    }

    /// True when the report names one class and cites at least one rule.
    pub fn is_complete(&self) -> bool {
        self.device_class.is_some() && !self.rules.is_empty()
    }
}
