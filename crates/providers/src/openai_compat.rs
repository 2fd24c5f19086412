//! OpenAI-compatible inference adapter.
//!
//! Works with the Hugging Face router, Text Generation Inference, vLLM,
//! Ollama and any other endpoint that follows the OpenAI chat completions
//! contract. Each prompt is sent as a single user message.

use crate::traits::{InferenceBackend, InferenceRequest};
use crate::util::from_reqwest;
use serde_json::Value;
use std::time::Duration;
use vc_domain::config::ModelsConfig;
use vc_domain::error::{Error, Result};

/// Upper bound on generated tokens per reply.
const MAX_TOKENS: u32 = 512;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct OpenAiCompatBackend {
    id: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            id: "openai_compat".into(),
            client,
        })
    }

    pub fn from_config(config: &ModelsConfig) -> Result<Self> {
        Self::new(Duration::from_millis(config.request_timeout_ms))
    }
}

fn chat_url(endpoint: &str) -> String {
    format!("{}/chat/completions", endpoint.trim_end_matches('/'))
}

fn build_chat_body(req: &InferenceRequest) -> Value {
    serde_json::json!({
        "model": req.model_id,
        "messages": [
            { "role": "user", "content": req.prompt },
        ],
        "temperature": req.temperature,
        "max_tokens": MAX_TOKENS,
        "stream": false,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn parse_chat_response(body: &Value) -> Result<String> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Inference("no choices in response".into()))?;

    let content = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Inference("no message content in choice".into()))?;

    Ok(content.trim().to_string())
}

/// Pull a readable message out of an error body, if it is JSON.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(String::from))
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl InferenceBackend for OpenAiCompatBackend {
    async fn complete(&self, req: &InferenceRequest) -> Result<String> {
        let url = chat_url(&req.endpoint);
        let body = build_chat_body(req);

        tracing::debug!(
            backend = %self.id,
            url = %url,
            model_id = %req.model_id,
            "chat completion request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(key) = &req.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key.expose()));
        }

        let resp = builder.json(&body).send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => Error::Auth(error_message(&resp_text)),
                code => Error::Inference(format!("HTTP {} - {}", code, error_message(&resp_text))),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&resp_json)
    }

    fn backend_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> InferenceRequest {
        InferenceRequest {
            model_id: "mistralai/Mistral-7B-Instruct-v0.2".into(),
            endpoint: "https://router.huggingface.co/v1/".into(),
            api_key: None,
            temperature: 0.7,
            prompt: "hello".into(),
        }
    }

    #[test]
    fn url_strips_trailing_slash() {
        assert_eq!(
            chat_url(&request().endpoint),
            "https://router.huggingface.co/v1/chat/completions"
        );
    }

    #[test]
    fn body_sends_prompt_as_single_user_message() {
        let body = build_chat_body(&request());
        assert_eq!(body["model"], "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn parses_first_choice_content() {
        let body = serde_json::json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  hi there \n" } }
            ]
        });
        assert_eq!(parse_chat_response(&body).unwrap(), "hi there");
    }

    #[test]
    fn missing_choices_is_inference_error() {
        let body = serde_json::json!({ "object": "error" });
        assert!(matches!(
            parse_chat_response(&body),
            Err(Error::Inference(_))
        ));
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"error":{"message":"model is loading"}}"#),
            "model is loading"
        );
        assert_eq!(error_message(r#"{"error":"rate limited"}"#), "rate limited");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }
}
