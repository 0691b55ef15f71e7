//! OpenAI-compatible chat completions client.
//!
//! Works with any endpoint exposing `/chat/completions` (OpenAI, vLLM,
//! Ollama). Requests JSON-object output since every caller parses the reply
//! as a JSON document.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::app::ports::TextGenerator;
use crate::config::LlmConfig;
use crate::error::{Result, TrackerError};

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str, temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let mut request = self.client.post(self.chat_completions_url());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.json(&body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TrackerError::Api {
                message: format!("HTTP {}: {}", status, text),
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| TrackerError::Generation("no choices in response".to_string()))?;

        debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_ignores_trailing_slash() {
        let client = OpenAiClient::new(&LlmConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            model: "llama3.2".to_string(),
            api_key: None,
            timeout_seconds: Some(5),
        })
        .unwrap();
        assert_eq!(client.chat_completions_url(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model(), "llama3.2");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.25,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.25);
    }

    #[test]
    fn test_empty_choices_parse() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());
    }
}
