//! Response sanitization and fact extraction.
//!
//! Model output is untrusted text. It is sanitized, the JSON object is
//! located (bare, fenced, or embedded in prose), and each entry is coerced
//! against the active section's field table. A bad value rejects only its
//! own field.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::schema::{FactSet, FieldDefinition};

/// Maximum allowed response length (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Maximum length for individual string values in extracted data (10KB).
pub const MAX_FIELD_LENGTH: usize = 10_000;

/// Errors that can occur during sanitization.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },

    #[error("Invalid UTF-8 encoding at byte position {position}")]
    InvalidUtf8 { position: usize },
}

/// Errors that fail a whole extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Sanitization failed: {0}")]
    Sanitization(#[from] SanitizationError),

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Sanitizes model responses before they are parsed or shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Sanitizes a model response.
    ///
    /// # Steps
    /// 1. Validate length
    /// 2. Remove control characters (except newlines/tabs)
    /// 3. Strip prompt-injection markers
    /// 4. Reject replacement characters left by lossy decoding
    pub fn sanitize(&self, response: &str) -> Result<String, SanitizationError> {
        if response.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: response.len(),
            });
        }

        let cleaned: String = response
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        let stripped = self.strip_injection_markers(&cleaned);

        if let Some(position) = stripped.chars().position(|c| c == '\u{FFFD}') {
            return Err(SanitizationError::InvalidUtf8 { position });
        }

        Ok(stripped)
    }

    fn strip_injection_markers(&self, s: &str) -> String {
        const PATTERNS: [&str; 11] = [
            "```system",
            "```assistant",
            "[INST]",
            "[/INST]",
            "<|system|>",
            "<|assistant|>",
            "<|user|>",
            "<|im_start|>",
            "<|im_end|>",
            "<<SYS>>",
            "<</SYS>>",
        ];

        let mut result = s.to_string();
        for pattern in PATTERNS {
            result = result.replace(pattern, "");
        }
        result
    }
}

/// Result of one extraction pass over a section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFacts {
    /// Values that coerced cleanly, keyed by field name.
    pub updates: FactSet,
    /// Fields whose value was present but invalid; they stay unset.
    pub rejected: Vec<ValidationError>,
    /// Keys that are not fields of the section.
    pub ignored: Vec<String>,
}

impl ExtractedFacts {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Turns a structured model response into typed fact updates.
#[derive(Debug, Clone, Default)]
pub struct DataExtractor {
    sanitizer: ResponseSanitizer,
}

impl DataExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts the facts of `fields` from a model response.
    ///
    /// `null` values mean "not mentioned" and are skipped. Keys outside
    /// `fields` are ignored rather than trusted.
    pub fn extract(
        &self,
        fields: &[FieldDefinition],
        response: &str,
    ) -> Result<ExtractedFacts, ExtractionError> {
        let object = self.parse_object(response)?;
        let mut extracted = ExtractedFacts::default();

        for (key, raw) in object {
            let Some(field) = fields.iter().find(|f| f.name == key) else {
                extracted.ignored.push(key);
                continue;
            };
            if raw.is_null() {
                continue;
            }
            match field.coerce(&raw) {
                Ok(value) => extracted.updates.set(field.name, value),
                Err(err) => extracted.rejected.push(err),
            }
        }

        Ok(extracted)
    }

    /// Sanitizes `response` and parses the first JSON object in it.
    pub fn parse_object(&self, response: &str) -> Result<Map<String, Value>, ExtractionError> {
        let sanitized = self.sanitizer.sanitize(response)?;
        let json_str = self.extract_json_from_response(&sanitized);

        let value: Value = serde_json::from_str(&json_str)
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?;

        match self.sanitize_json_strings(value) {
            Value::Object(map) => Ok(map),
            Value::Array(_) => Err(ExtractionError::NotAnObject("an array")),
            Value::String(_) => Err(ExtractionError::NotAnObject("a string")),
            _ => Err(ExtractionError::NotAnObject("a scalar")),
        }
    }

    /// Extracts JSON from a response that may contain markdown code blocks.
    fn extract_json_from_response(&self, response: &str) -> String {
        let trimmed = response.trim();

        if let Some(json) = Self::extract_from_code_block(trimmed) {
            return json;
        }

        if let Some(start) = trimmed.find('{') {
            if let Some(json) = Self::extract_balanced_object(trimmed, start) {
                return json;
            }
        }

        // Let the JSON parser report the problem.
        trimmed.to_string()
    }

    fn extract_from_code_block(s: &str) -> Option<String> {
        let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

        for pattern in patterns {
            if let Some(start) = s.find(pattern) {
                let json_start = start + pattern.len();
                if let Some(end) = s[json_start..].find("```") {
                    return Some(s[json_start..json_start + end].trim().to_string());
                }
            }
        }
        None
    }

    fn extract_balanced_object(s: &str, start: usize) -> Option<String> {
        let mut depth = 0;
        let mut in_string = false;
        let mut escape_next = false;

        for (i, c) in s[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                _ if in_string => {}
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(s[start..start + i + 1].to_string());
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Recursively strips markup from and truncates string values.
    fn sanitize_json_strings(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(Self::sanitize_string_field(&s)),
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|v| self.sanitize_json_strings(v))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, self.sanitize_json_strings(v)))
                    .collect(),
            ),
            other => other,
        }
    }

    fn sanitize_string_field(s: &str) -> String {
        let mut no_html = String::with_capacity(s.len());
        let mut rest = s;
        while let Some(open) = rest.find('<') {
            no_html.push_str(&rest[..open]);
            let candidate = &rest[open..];
            match Self::tag_len(candidate) {
                Some(len) => rest = &candidate[len..],
                None => {
                    no_html.push('<');
                    rest = &candidate[1..];
                }
            }
        }
        no_html.push_str(rest);

        if no_html.len() > MAX_FIELD_LENGTH {
            let mut cut = MAX_FIELD_LENGTH;
            while !no_html.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...[truncated]", &no_html[..cut])
        } else {
            no_html
        }
    }

    /// Byte length of the markup tag at the start of `s`, if there is one.
    ///
    /// A tag is `<name ...>`, `</name>` or `<!...>` with no `<` before its
    /// closing `>`. Anything else, such as `<5 Fr`, is ordinary text.
    fn tag_len(s: &str) -> Option<usize> {
        let mut chars = s.chars().skip(1);
        let opens_tag = match chars.next() {
            Some('/') => chars.next().is_some_and(|c| c.is_ascii_alphabetic()),
            Some('!') => true,
            Some(c) => c.is_ascii_alphabetic(),
            None => false,
        };
        if !opens_tag {
            return None;
        }
        let close = s[1..].find(|c: char| c == '<' || c == '>')? + 1;
        (s.as_bytes()[close] == b'>').then_some(close + 1)
    }
}
