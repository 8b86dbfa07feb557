// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-backed retrieval for university attributes.
//!
//! Wraps the Chat Completions API with two high-level operations:
//! basic-info lookup (canonical name, abbreviation, website, Wikipedia
//! page) and single-attribute resolution. Both pin temperature to 0 so
//! repeated runs produce stable answers.

mod client;
pub mod prompt;
pub mod types;

pub use client::OpenAiClient;
pub use prompt::{parse_attribute_answer, parse_basic_info, AttributeAnswer};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Usage};

use unigen_config::OpenAiConfig;
use unigen_core::{AttributeRequest, BasicInfo, UnigenError};

/// High-level OpenAI retrieval backend.
///
/// Holds the HTTP client and the model configuration; every call reports
/// token usage so callers can feed the quota ledger.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: OpenAiClient,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> Result<Self, UnigenError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| UnigenError::Config("openai.api_key is not set".into()))?;
        let client = OpenAiClient::new(api_key)?;
        Ok(Self { client, config })
    }

    /// Builds a backend around an existing client (for tests).
    pub fn with_client(client: OpenAiClient, config: OpenAiConfig) -> Self {
        Self { client, config }
    }

    /// Resolves the canonical identity of a university from a free-form alias.
    ///
    /// Uses the cheaper `basic_model` since the answer is a short JSON object.
    pub async fn basic_info(&self, alias: &str) -> Result<(BasicInfo, Usage), UnigenError> {
        let request = ChatRequest {
            model: self.config.basic_model.clone(),
            messages: prompt::basic_info_messages(alias),
            max_tokens: Some(self.config.max_tokens),
            temperature: 0.0,
        };
        let response = self.client.complete(&request).await?;
        let content = response.content().ok_or_else(|| UnigenError::Provider {
            message: "empty completion for basic info request".into(),
            source: None,
        })?;
        let info = parse_basic_info(content)?;
        Ok((info, response.usage))
    }

    /// Resolves one attribute of one university.
    ///
    /// When `context` is given (search snippets), it is appended as an extra
    /// user message so the model grounds its answer in the retrieved pages.
    pub async fn attribute(
        &self,
        request: &AttributeRequest,
        context: Option<&str>,
    ) -> Result<(AttributeAnswer, Usage), UnigenError> {
        let mut messages = prompt::attribute_messages(request);
        if let Some(context) = context {
            messages.push(ChatMessage::user(format!(
                "Here are search results that may contain the answer:\n\n{context}"
            )));
        }
        let chat = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: 0.0,
        };
        let response = self.client.complete(&chat).await?;
        let content = response.content().ok_or_else(|| UnigenError::Provider {
            message: format!(
                "empty completion for attribute '{}'",
                request.spec.name
            ),
            source: None,
        })?;
        let answer = parse_attribute_answer(content)?;
        Ok((answer, response.usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unigen_core::{AttributeFormat, AttributeSpec, HandlerKind};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend(base_url: &str) -> OpenAiBackend {
        let config = OpenAiConfig {
            api_key: Some("sk-test".into()),
            ..OpenAiConfig::default()
        };
        let client = OpenAiClient::new("sk-test")
            .unwrap()
            .with_base_url(base_url.to_string());
        OpenAiBackend::with_client(client, config)
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 100, "completion_tokens": 30, "total_tokens": 130}
        })
    }

    #[tokio::test]
    async fn basic_info_uses_cheap_model_and_parses_json() {
        let server = MockServer::start().await;
        let body = r#"{"university_name": "University of Toronto", "abbreviation": "UofT", "website": "https://www.utoronto.ca/", "wikipedia": "https://en.wikipedia.org/wiki/University_of_Toronto"}"#;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(
                serde_json::json!({"model": "gpt-3.5-turbo", "temperature": 0.0}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(body)))
            .mount(&server)
            .await;

        let (info, usage) = backend(&server.uri()).basic_info("UofT").await.unwrap();
        assert_eq!(info.university_name, "University of Toronto");
        assert_eq!(usage.total_tokens, 130);
    }

    #[tokio::test]
    async fn attribute_appends_search_context() {
        let server = MockServer::start().await;
        let body = r#"{"output": "55000", "reference": ["https://example.edu/stats"]}"#;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(body)))
            .mount(&server)
            .await;

        let request = AttributeRequest {
            university_name: "University of Toronto".into(),
            spec: AttributeSpec {
                name: "populations".into(),
                format: AttributeFormat::Number,
                handlers: vec![HandlerKind::SearchRetrieval],
                extra_prompt: None,
                reference: None,
                example: None,
            },
            reference: "https://www.utoronto.ca/".into(),
        };
        let (answer, usage) = backend(&server.uri())
            .attribute(&request, Some("Enrollment is about 55,000 students."))
            .await
            .unwrap();
        assert_eq!(answer.output_text(), "55000");
        assert_eq!(answer.reference, vec!["https://example.edu/stats"]);
        assert_eq!(usage.completion_tokens, 30);
    }
}
