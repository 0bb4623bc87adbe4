//! Session configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the classification rule text
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// Print section status updates between questions
    #[serde(default = "default_echo_status")]
    pub echo_status: bool,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rules_path.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("MDR_CLASSIFIER__SESSION__RULES_PATH"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            echo_status: default_echo_status(),
        }
    }
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("classification-rules/rules_raw_from_pdf.md")
}

fn default_echo_status() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert_eq!(
            config.rules_path,
            PathBuf::from("classification-rules/rules_raw_from_pdf.md")
        );
        assert!(config.echo_status);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_rules_path_is_invalid() {
        let config = SessionConfig {
            rules_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
