//! Shared fakes for gateway tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use vc_domain::config::Config;
use vc_domain::error::{Error, Result};
use vc_gateway::bootstrap;
use vc_gateway::state::AppState;
use vc_providers::{InferenceBackend, InferenceRequest};
use vc_speech::SpeechServices;

/// Answers `reply N` to the N-th call and records every request, or fails
/// while `failing` is set.
#[derive(Default)]
pub struct ScriptedBackend {
    pub calls: Mutex<Vec<(String, String)>>,
    pub failing: AtomicBool,
}

impl ScriptedBackend {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _)| m.clone()).collect()
    }
}

#[async_trait::async_trait]
impl InferenceBackend for ScriptedBackend {
    async fn complete(&self, req: &InferenceRequest) -> Result<String> {
        let n = {
            let mut calls = self.calls.lock();
            calls.push((req.model_id.clone(), req.prompt.clone()));
            calls.len()
        };
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Http("HTTP 503 - model is loading".into()));
        }
        Ok(format!("reply {n}"))
    }

    fn backend_id(&self) -> &str {
        "scripted"
    }
}

/// App state over the built-in catalog with a scripted backend.
pub fn test_state() -> (AppState, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::default());
    let config = Config::default();
    let speech = Arc::new(SpeechServices::from_config(&config.speech).unwrap());
    let state =
        bootstrap::build_app_state_with(Arc::new(config), backend.clone(), speech).unwrap();
    (state, backend)
}
