use crate::catalog::ModelDescriptor;
use crate::traits::{InferenceBackend, InferenceRequest};
use std::sync::Arc;
use std::time::Instant;
use vc_domain::error::{Error, Result};
use vc_domain::trace::TraceEvent;

/// A resolved model bound to a backend, ready to answer prompts.
///
/// Holds no state beyond its configuration: construction never touches the
/// network, so a bad key or unreachable endpoint shows up on the first
/// [`invoke`](Self::invoke).
#[derive(Clone)]
pub struct ModelSession {
    descriptor: Arc<ModelDescriptor>,
    backend: Arc<dyn InferenceBackend>,
}

impl ModelSession {
    pub fn initialize(
        descriptor: Arc<ModelDescriptor>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Result<Self> {
        if descriptor.endpoint.trim().is_empty() {
            return Err(Error::ModelInit(format!(
                "{}: endpoint is empty",
                descriptor.task_type
            )));
        }
        if !(0.0..=1.0).contains(&descriptor.temperature) {
            return Err(Error::ModelInit(format!(
                "{}: temperature {} outside [0, 1]",
                descriptor.task_type, descriptor.temperature
            )));
        }
        Ok(Self {
            descriptor,
            backend,
        })
    }

    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// Run one completion. Any backend failure comes back as
    /// [`Error::Inference`]; there is no retry.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        let d = &self.descriptor;
        let req = InferenceRequest {
            model_id: d.model_id.clone(),
            endpoint: d.endpoint.clone(),
            api_key: d.api_key.clone(),
            temperature: d.temperature,
            prompt: prompt.to_string(),
        };

        let start = Instant::now();
        let result = self.backend.complete(&req).await;

        TraceEvent::InferenceRequest {
            task_type: d.task_type.clone(),
            model_id: d.model_id.clone(),
            prompt_chars: prompt.chars().count(),
            duration_ms: start.elapsed().as_millis() as u64,
            ok: result.is_ok(),
        }
        .emit();

        result.map_err(|e| match e {
            Error::Inference(msg) => Error::Inference(msg),
            other => {
                tracing::warn!(
                    backend = %self.backend.backend_id(),
                    model_id = %d.model_id,
                    error = %other,
                    "inference call failed"
                );
                Error::Inference(other.to_string())
            }
        })
    }
}
