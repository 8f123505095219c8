//! OpenAI-compatible chat-completions generator
//!
//! Works against any server exposing `POST {base_url}/chat/completions`
//! (OpenAI, Groq, Mistral, a local Ollama or vLLM). Each prompt is sent as a
//! single user message after a fixed system message.

use crate::config::FileGeneratorConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use stagecraft_application::{ContentGenerator, GenerationError};
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are an experienced playwright and script editor. \
Follow the requested response format exactly.";

/// Connection settings for [`ChatCompletionsGenerator`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl GeneratorSettings {
    /// Build settings from the `[generator]` section, reading the API key
    /// from the configured environment variable.
    pub fn from_config(config: &FileGeneratorConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Content generator over an OpenAI-compatible HTTP API
#[derive(Clone)]
pub struct ChatCompletionsGenerator {
    client: Client,
    settings: GeneratorSettings,
}

impl ChatCompletionsGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::ConnectionError(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    /// Extract the first choice's text from a response body.
    fn parse_response(body: &str) -> Result<String, GenerationError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| GenerationError::InvalidResponse(format!("malformed body: {e}")))?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("response has no content".to_string()))
    }
}

#[async_trait]
impl ContentGenerator for ChatCompletionsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.settings.endpoint();
        debug!(
            "Sending {} byte prompt to {} ({})",
            prompt.len(),
            url,
            self.settings.model
        );

        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.settings.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::InvalidResponse(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(GenerationError::RequestFailed(format!(
                "{}: {}",
                status,
                stagecraft_domain::core::text::truncate(&body, 500)
            )));
        }

        let content = Self::parse_response(&body)?;
        debug!("Received {} byte response", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GeneratorSettings {
        GeneratorSettings {
            base_url: "http://localhost:8080/v1".to_string(),
            model: "test-model".to_string(),
            api_key: None,
            temperature: 0.5,
            max_tokens: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_from_config_trims_base_url() {
        let config = FileGeneratorConfig {
            base_url: "http://localhost:8080/v1/".to_string(),
            api_key_env: "STAGECRAFT_TEST_UNSET_KEY_VARIABLE".to_string(),
            ..Default::default()
        };
        let settings = GeneratorSettings::from_config(&config);
        assert_eq!(settings.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_request_body_shape() {
        let generator = ChatCompletionsGenerator::new(settings()).unwrap();
        let body = serde_json::to_value(generator.request_body("Refine this")).unwrap();
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Refine this");
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"REFINED SCENE:\nHi"}}]}"#;
        assert_eq!(
            ChatCompletionsGenerator::parse_response(body).unwrap(),
            "REFINED SCENE:\nHi"
        );
    }

    #[test]
    fn test_parse_response_without_content() {
        let empty = r#"{"choices":[]}"#;
        assert!(matches!(
            ChatCompletionsGenerator::parse_response(empty),
            Err(GenerationError::InvalidResponse(_))
        ));
        assert!(ChatCompletionsGenerator::parse_response("not json").is_err());
    }
}
