//! LLM-backed final classification.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::conversation::ClassificationReport;
use crate::domain::foundation::SessionId;
use crate::domain::schema::FactSet;
use crate::ports::{
    AIProvider, CallPurpose, CompletionRequest, DeviceClassifier, MessageRole, OracleError,
    RequestMetadata,
};

/// Classifies the device from the collected facts and the rule text.
pub struct LlmDeviceClassifier {
    ai_provider: Arc<dyn AIProvider>,
}

impl LlmDeviceClassifier {
    pub fn new(ai_provider: Arc<dyn AIProvider>) -> Self {
        Self { ai_provider }
    }

    fn create_system_prompt(rules: &str) -> String {
        if rules.trim().is_empty() {
            return "You are an expert in EU medical device regulation.".to_string();
        }
        format!(
            "You are an expert in EU medical device regulation. \
             Base the classification on these rules:\n\n{}",
            rules
        )
    }

    fn create_prompt(facts: &FactSet) -> String {
        format!(
            r#"Classify this medical device according to MDR (EU) 2017/745 Annex VIII.

Facts gathered:
{}

Output format:
**Class**: (I, IIa, IIb, or III)
**Rule**: (the applicable rule number or numbers)
**Reasoning**: (a brief explanation)"#,
            facts.known_json()
        )
    }
}

#[async_trait]
impl DeviceClassifier for LlmDeviceClassifier {
    async fn classify(
        &self,
        session_id: SessionId,
        facts: &FactSet,
        rules: &str,
    ) -> Result<ClassificationReport, OracleError> {
        let request = CompletionRequest::new(RequestMetadata::new(
            session_id,
            CallPurpose::Classification,
        ))
        .with_system_prompt(Self::create_system_prompt(rules))
        .with_message(MessageRole::User, Self::create_prompt(facts))
        .with_temperature(0.0);

        let response = self.ai_provider.complete(request).await?;
        let text = response.content.trim();
        if text.is_empty() {
            return Err(OracleError::EmptyResponse);
        }

        let report = ClassificationReport::from_text(text);
        if !report.is_complete() {
            tracing::warn!(
                device_class = ?report.device_class,
                rules = ?report.rules,
                "Classification report lacks a single class or a rule citation"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::domain::conversation::DeviceClass;
    use crate::domain::schema::FactValue;

    fn facts() -> FactSet {
        let mut facts = FactSet::new();
        facts.set("device_name", FactValue::Text("Reusable scalpel".into()));
        facts.set("is_invasive", FactValue::Bool(true));
        facts.set("is_reusable_instrument", FactValue::Bool(true));
        facts
    }

    #[tokio::test]
    async fn parses_class_and_rules() {
        let mock = MockAIProvider::new().with_response_for(
            CallPurpose::Classification,
            "**Class**: I\n**Rule**: 6\n**Reasoning**: Reusable surgical instrument.",
        );
        let classifier = LlmDeviceClassifier::new(Arc::new(mock.clone()));

        let report = classifier
            .classify(SessionId::new(), &facts(), "Rule 6 ...")
            .await
            .unwrap();

        assert_eq!(report.device_class, Some(DeviceClass::I));
        assert_eq!(report.rules, vec![6]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn prompt_carries_facts_and_rules() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Classification, "**Class**: I\n**Rule**: 6");
        let classifier = LlmDeviceClassifier::new(Arc::new(mock.clone()));

        classifier
            .classify(SessionId::new(), &facts(), "RULE TEXT")
            .await
            .unwrap();

        let call = &mock.get_calls()[0];
        assert!(call.system_prompt.as_deref().unwrap().ends_with("RULE TEXT"));
        let prompt = call.last_user_content().unwrap();
        assert!(prompt.contains(
            r#"{"device_name":"Reusable scalpel","is_invasive":true,"is_reusable_instrument":true}"#
        ));
        assert!(prompt.contains("Annex VIII"));
    }

    #[tokio::test]
    async fn empty_rules_still_classify() {
        let mock = MockAIProvider::new()
            .with_response_for(CallPurpose::Classification, "**Class**: IIa\n**Rule**: 7");
        let classifier = LlmDeviceClassifier::new(Arc::new(mock.clone()));

        let report = classifier.classify(SessionId::new(), &facts(), "").await.unwrap();

        assert_eq!(report.device_class, Some(DeviceClass::IIa));
        assert!(!mock.get_calls()[0]
            .system_prompt
            .as_deref()
            .unwrap()
            .contains("these rules"));
    }

    #[tokio::test]
    async fn blank_output_is_an_error() {
        let mock = MockAIProvider::new().with_response_for(CallPurpose::Classification, "  ");
        let classifier = LlmDeviceClassifier::new(Arc::new(mock));

        let err = classifier
            .classify(SessionId::new(), &facts(), "")
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::EmptyResponse));
    }

    #[tokio::test]
    async fn provider_failure_is_returned() {
        let mock = MockAIProvider::new().with_error_for(
            CallPurpose::Classification,
            MockError::RateLimited {
                retry_after_secs: 30,
            },
        );
        let classifier = LlmDeviceClassifier::new(Arc::new(mock));

        let err = classifier
            .classify(SessionId::new(), &facts(), "")
            .await
            .unwrap_err();

        assert!(matches!(err, OracleError::Provider(_)));
    }
}
