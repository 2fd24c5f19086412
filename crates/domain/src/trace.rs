use serde::Serialize;

/// Structured trace events emitted across all VoiceChat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    CatalogLoaded {
        entries: usize,
        aliases: usize,
        default_task_type: String,
    },
    ModelSelected {
        requested: String,
        task_type: String,
        model_id: String,
        fallback: bool,
    },
    InferenceRequest {
        task_type: String,
        model_id: String,
        prompt_chars: usize,
        duration_ms: u64,
        ok: bool,
    },
    TurnAppended {
        session_id: String,
        turns: usize,
    },
    SpeechUnitFinished {
        connection_id: String,
        unit: String,
        outcome: String,
        duration_ms: u64,
    },
    ConnectionClosed {
        connection_id: String,
        suppressed_events: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "vc_event");
    }
}
