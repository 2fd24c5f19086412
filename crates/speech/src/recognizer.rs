//! Hosted speech recognition over the Hugging Face inference API.

use crate::devices::{AudioSample, SpeechRecognizer};
use base64::Engine as _;
use serde_json::Value;
use std::time::Duration;
use vc_domain::config::RecognizerConfig;
use vc_domain::error::{Error, Result};
use vc_providers::from_reqwest;

/// Sends base64 audio plus a language hint to an ASR endpoint and reads back
/// `{"text": ...}`.
pub struct HttpRecognizer {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpRecognizer {
    pub fn from_config(cfg: &RecognizerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(env_var = %cfg.api_key_env, "speech recognition API key not set");
        }
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            api_key,
            client,
        })
    }
}

/// `"ar-SA"` → `"ar"`.
fn language_hint(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}

fn build_body(sample: &AudioSample, language: &str) -> Value {
    serde_json::json!({
        "inputs": base64::engine::general_purpose::STANDARD.encode(&sample.bytes),
        "parameters": {
            "generate_kwargs": { "language": language_hint(language) },
        },
    })
}

fn parse_transcript(body: &Value) -> Option<String> {
    body.get("text")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

#[async_trait::async_trait]
impl SpeechRecognizer for HttpRecognizer {
    async fn recognize(&self, sample: &AudioSample, language: &str) -> Result<Option<String>> {
        let mut req = self.client.post(&self.endpoint).json(&build_body(sample, language));
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;
        if !status.is_success() {
            return Err(Error::Recognition(format!(
                "HTTP {} - {}",
                status.as_u16(),
                text.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = serde_json::from_str(&text)?;
        Ok(parse_transcript(&body))
    }
}
