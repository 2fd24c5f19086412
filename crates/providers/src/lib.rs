//! Model catalog, task-type selection and inference backends.

pub mod aliases;
pub mod catalog;
pub mod openai_compat;
pub mod selector;
pub mod session;
pub mod traits;
pub mod util;

// Re-exports for convenience.
pub use aliases::TaskAliasMap;
pub use catalog::{CodingModelInfo, ModelCatalog, ModelDescriptor};
pub use openai_compat::OpenAiCompatBackend;
pub use selector::ModelSelector;
pub use session::ModelSession;
pub use traits::{ApiKey, InferenceBackend, InferenceRequest};
pub use util::from_reqwest;
