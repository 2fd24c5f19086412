/// Shared error type used across all VoiceChat crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// Catalog / alias inconsistency. Fatal at startup.
    #[error("configuration: {0}")]
    Config(String),

    /// Even the default task type is missing from the catalog.
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("no model selected")]
    NoModelSelected,

    #[error("empty message")]
    EmptyMessage,

    #[error("model init: {0}")]
    ModelInit(String),

    #[error("inference: {0}")]
    Inference(String),

    #[error("audio capture: {0}")]
    Capture(String),

    #[error("recognition: {0}")]
    Recognition(String),

    #[error("synthesis: {0}")]
    Synthesis(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
