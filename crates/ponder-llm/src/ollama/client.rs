// Ollama-compatible client (`POST {base_url}/api/chat`)

use crate::streaming::{parse_response_stream, ChunkStream};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

pub const OLLAMA_API_BASE: &str = "http://localhost:11434";

/// Local inference client (HTTP direct, no SDK)
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the default local endpoint
    pub fn local() -> Result<Self> {
        Self::new(OLLAMA_API_BASE)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    /// Build `/api/chat` payload
    pub fn build_chat_request(
        &self,
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
        stream: bool,
    ) -> Result<Value> {
        let mut request = serde_json::json!({
            "model": model,
            "messages": serde_json::to_value(messages)?,
            "stream": stream,
        });

        let mut model_options = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            model_options.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            model_options.insert("num_predict".to_string(), serde_json::json!(max_tokens));
        }

        if let Some(obj) = request.as_object_mut() {
            if !model_options.is_empty() {
                obj.insert("options".to_string(), Value::Object(model_options));
            }
            if let Some(keep_alive) = &options.keep_alive {
                obj.insert("keep_alive".to_string(), serde_json::json!(keep_alive));
            }
        }

        Ok(request)
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(self.chat_url())
            .json(body)
            .send()
            .await
            .context("Failed to reach model backend")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Model backend error ({}): {}", status, error_text.trim());
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let body =
            self.build_chat_request(&request.model, &request.messages, &request.options, false)?;
        let raw: Value = self
            .send(&body)
            .await?
            .json()
            .await
            .context("Failed to parse chat response")?;

        if let Some(error) = raw.get("error").and_then(Value::as_str) {
            anyhow::bail!("Model backend error: {}", error);
        }

        let content = raw["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let done_reason = raw["done_reason"].as_str().map(str::to_string);

        Ok(ChatResponse {
            content,
            done_reason,
            raw,
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream> {
        let body =
            self.build_chat_request(&request.model, &request.messages, &request.options, true)?;

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Opening chat stream"
        );

        let response = self.send(&body).await?;
        Ok(parse_response_stream(response))
    }
}
