use std::fmt;
use vc_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Secrets
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An inference API key. Never printed and never serialized.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building an auth header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One single-prompt completion call against a hosted model.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Backend model identifier, e.g. `"mistralai/Mistral-7B-Instruct-v0.2"`.
    pub model_id: String,
    /// Base URL of the inference API.
    pub endpoint: String,
    /// `None` sends the request unauthenticated.
    pub api_key: Option<ApiKey>,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// The fully rendered prompt.
    pub prompt: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core backend trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trait every inference adapter implements.
///
/// The backend is stateless with respect to conversations; everything it
/// needs arrives in the request.
#[async_trait::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, req: &InferenceRequest) -> Result<String>;

    /// A short identifier used in logs.
    fn backend_id(&self) -> &str;
}
