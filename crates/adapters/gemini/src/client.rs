//! HTTP client for `generateContent`.

use std::time::Duration;

use hostflow_app::ports::SuggestionGenerator;
use hostflow_domain::error::{ExternalServiceError, HostflowError};
use hostflow_domain::suggestion::SuggestionResponse;

use crate::config::GeminiConfig;
use crate::prompt::{self, GenerateContentResponse};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Suggestion generator calling the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiSuggestionGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiSuggestionGenerator {
    /// Build the generator and its HTTP client.
    ///
    /// A missing API key is not an error here; [`generate`](SuggestionGenerator::generate)
    /// reports it on every call so the rest of the service keeps working.
    ///
    /// # Errors
    ///
    /// Returns [`ExternalServiceError::NotConfigured`] if the HTTP client
    /// cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, HostflowError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ExternalServiceError::NotConfigured(err.to_string()))?;
        if config.api_key.is_none() {
            tracing::warn!("no Gemini API key configured, suggestions are disabled");
        }
        Ok(Self { client, config })
    }
}

impl SuggestionGenerator for GeminiSuggestionGenerator {
    async fn generate(&self, text: &str) -> Result<SuggestionResponse, HostflowError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(
                ExternalServiceError::NotConfigured("GEMINI_API_KEY is not set".into()).into(),
            );
        };

        let url = self.config.generate_url();
        tracing::debug!(model = %self.config.model, prompt_len = text.len(), "requesting suggestions");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&prompt::build_request(text))
            .send()
            .await
            .map_err(|err| ExternalServiceError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "suggestion request rejected");
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ExternalServiceError::InvalidResponse(err.to_string()))?;

        let content = envelope.text();
        let content = prompt::strip_code_fence(&content);
        if content.is_empty() {
            return Err(ExternalServiceError::EmptyResponse.into());
        }

        let parsed: SuggestionResponse = serde_json::from_str(content)
            .map_err(|err| ExternalServiceError::InvalidResponse(err.to_string()))?;
        tracing::debug!(
            suggestions = parsed.suggested_workflows.len(),
            issues = parsed.errors.len(),
            "received suggestions"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    use super::*;

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn config(endpoint: String, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(String::from),
            endpoint,
            timeout_secs: 5,
            ..GeminiConfig::default()
        }
    }

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash-lite:generateContent";

    #[tokio::test]
    async fn should_parse_suggestions_from_model_text() {
        let router = Router::new().route(
            GENERATE_PATH,
            post(|headers: HeaderMap, axum::Json(body): axum::Json<Value>| async move {
                assert_eq!(headers[API_KEY_HEADER], "test-key");
                assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
                let text = json!({
                    "suggested_workflows": [{
                        "workflow_name": "Post-Checkout Cleaning",
                        "trigger_name": "Guest checks out",
                        "action_name": "Create Task",
                        "rule_type": "scheduled",
                        "delay_time": 2,
                        "delay_unit": "hours"
                    }]
                })
                .to_string();
                axum::Json(json!({
                    "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
                }))
            }),
        );
        let endpoint = spawn_mock(router).await;
        let generator = GeminiSuggestionGenerator::new(config(endpoint, Some("test-key"))).unwrap();

        let response = generator
            .generate("clean two hours after checkout")
            .await
            .unwrap();

        assert_eq!(response.suggested_workflows.len(), 1);
        assert_eq!(
            response.suggested_workflows[0].trigger_name.as_deref(),
            Some("Guest checks out")
        );
        assert!(response.errors.is_empty());
    }

    #[tokio::test]
    async fn should_report_upstream_status_and_body() {
        let router = Router::new().route(
            GENERATE_PATH,
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quota exceeded") }),
        );
        let endpoint = spawn_mock(router).await;
        let generator = GeminiSuggestionGenerator::new(config(endpoint, Some("test-key"))).unwrap();

        let err = generator.generate("anything").await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::ExternalService(ExternalServiceError::Status { status: 500, ref body })
                if body == "quota exceeded"
        ));
    }

    #[tokio::test]
    async fn should_report_empty_model_output() {
        let router = Router::new().route(
            GENERATE_PATH,
            post(|| async { axum::Json(json!({ "candidates": [] })) }),
        );
        let endpoint = spawn_mock(router).await;
        let generator = GeminiSuggestionGenerator::new(config(endpoint, Some("test-key"))).unwrap();

        let err = generator.generate("anything").await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::ExternalService(ExternalServiceError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn should_report_non_json_model_output() {
        let router = Router::new().route(
            GENERATE_PATH,
            post(|| async {
                axum::Json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "Sure! Here you go." }] } }]
                }))
            }),
        );
        let endpoint = spawn_mock(router).await;
        let generator = GeminiSuggestionGenerator::new(config(endpoint, Some("test-key"))).unwrap();

        let err = generator.generate("anything").await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::ExternalService(ExternalServiceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn should_refuse_without_api_key() {
        let generator =
            GeminiSuggestionGenerator::new(config("http://127.0.0.1:9".into(), None)).unwrap();

        let err = generator.generate("anything").await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::ExternalService(ExternalServiceError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn should_report_unreachable_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let generator =
            GeminiSuggestionGenerator::new(config(format!("http://{addr}"), Some("k"))).unwrap();

        let err = generator.generate("anything").await.unwrap_err();

        assert!(matches!(
            err,
            HostflowError::ExternalService(ExternalServiceError::Unreachable(_))
        ));
    }
}
