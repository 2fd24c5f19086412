use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Model catalog and task-type routing configuration.
///
/// When `catalog` is omitted the built-in Hugging Face catalog is used. When
/// `aliases` is omitted the built-in aliases are used together with the
/// built-in catalog, and no aliases at all with a custom catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Env var holding the inference API key shared by all catalog entries.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Task type used when a requested task type is unknown.
    #[serde(default = "d_default_task_type")]
    pub default_task_type: String,
    /// Endpoint used by entries that do not set their own.
    #[serde(default = "d_endpoint")]
    pub default_endpoint: String,
    /// Per-request timeout for inference calls.
    #[serde(default = "d_60000")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub catalog: Option<Vec<CatalogEntryConfig>>,
    #[serde(default)]
    pub aliases: Option<Vec<AliasConfig>>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            api_key_env: d_api_key_env(),
            default_task_type: d_default_task_type(),
            default_endpoint: d_endpoint(),
            request_timeout_ms: 60_000,
            catalog: None,
            aliases: None,
        }
    }
}

impl ModelsConfig {
    /// The effective catalog entries (configured or built-in).
    pub fn catalog_entries(&self) -> Vec<CatalogEntryConfig> {
        match &self.catalog {
            Some(entries) => entries.clone(),
            None => builtin_catalog(),
        }
    }

    /// The effective alias entries (configured, built-in, or none).
    pub fn alias_entries(&self) -> Vec<AliasConfig> {
        match (&self.aliases, &self.catalog) {
            (Some(aliases), _) => aliases.clone(),
            (None, None) => builtin_aliases(),
            (None, Some(_)) => Vec::new(),
        }
    }
}

/// One catalog entry: a task type bound to a backend model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntryConfig {
    pub task_type: String,
    /// Short catalog key, e.g. `"mistral-7b"`.
    pub model_key: String,
    /// Backend model identifier, e.g. `"mistralai/Mistral-7B-Instruct-v0.2"`.
    pub model_id: String,
    pub display_name: String,
    /// Overrides `default_endpoint` for this entry.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub strengths: Vec<String>,
}

/// A surface string that resolves to a canonical task type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasConfig {
    pub alias: String,
    pub task_type: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Built-in catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[allow(clippy::too_many_arguments)]
fn entry(
    task_type: &str,
    model_key: &str,
    model_id: &str,
    display_name: &str,
    temperature: f32,
    description: &str,
    size: &str,
    strengths: &[&str],
) -> CatalogEntryConfig {
    CatalogEntryConfig {
        task_type: task_type.into(),
        model_key: model_key.into(),
        model_id: model_id.into(),
        display_name: display_name.into(),
        endpoint: None,
        temperature,
        description: description.into(),
        size: size.into(),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
    }
}

/// The default Hugging Face catalog.
pub fn builtin_catalog() -> Vec<CatalogEntryConfig> {
    vec![
        entry(
            "general",
            "mistral-7b",
            "mistralai/Mistral-7B-Instruct-v0.2",
            "النموذج العام",
            0.7,
            "Balanced instruction-following model for everyday questions",
            "7B",
            &["general knowledge", "instruction following"],
        ),
        entry(
            "chat",
            "llama-2-7b",
            "meta-llama/Llama-2-7b-chat-hf",
            "نموذج المحادثة",
            0.8,
            "Dialogue-tuned model for open conversation",
            "7B",
            &["conversation", "friendly tone"],
        ),
        entry(
            "code",
            "codellama-7b",
            "codellama/CodeLlama-7b-Instruct-hf",
            "نموذج البرمجة",
            0.2,
            "General purpose code generation and explanation",
            "7B",
            &["code generation", "code explanation", "debugging"],
        ),
        entry(
            "code_python",
            "codellama-13b-python",
            "codellama/CodeLlama-13b-Python-hf",
            "نموذج Python",
            0.2,
            "Code Llama specialised on Python",
            "13B",
            &["python", "type hints", "standard library"],
        ),
        entry(
            "code_web",
            "starcoder2-15b",
            "bigcode/starcoder2-15b",
            "نموذج تطوير الويب",
            0.3,
            "Broad-language code model strong on web stacks",
            "15B",
            &["javascript", "typescript", "html/css", "react"],
        ),
        entry(
            "code_sql",
            "sqlcoder-7b",
            "defog/sqlcoder-7b-2",
            "نموذج قواعد البيانات",
            0.1,
            "Text-to-SQL model",
            "7B",
            &["sql", "schema design", "query optimisation"],
        ),
        entry(
            "code_algorithms",
            "deepseek-coder-6.7b",
            "deepseek-ai/deepseek-coder-6.7b-instruct",
            "نموذج الخوارزميات",
            0.2,
            "Code model tuned for algorithmic problem solving",
            "6.7B",
            &["algorithms", "data structures", "complexity analysis"],
        ),
        entry(
            "code_data_science",
            "phind-codellama-34b",
            "Phind/Phind-CodeLlama-34B-v2",
            "نموذج علم البيانات",
            0.2,
            "Large code model for data analysis workflows",
            "34B",
            &["pandas", "numpy", "machine learning"],
        ),
        entry(
            "analysis",
            "mixtral-8x7b",
            "mistralai/Mixtral-8x7B-Instruct-v0.1",
            "نموذج التحليل",
            0.3,
            "Mixture-of-experts model for structured analysis",
            "8x7B",
            &["reasoning", "summarisation", "analysis"],
        ),
        entry(
            "research",
            "zephyr-7b",
            "HuggingFaceH4/zephyr-7b-beta",
            "نموذج البحث",
            0.5,
            "Helpful assistant model for research questions",
            "7B",
            &["research", "explanations"],
        ),
        entry(
            "arabic",
            "jais-13b",
            "inceptionai/jais-13b-chat",
            "النموذج العربي",
            0.7,
            "Bilingual Arabic/English chat model",
            "13B",
            &["arabic", "english", "bilingual chat"],
        ),
    ]
}

/// Built-in aliases for the built-in catalog.
pub fn builtin_aliases() -> Vec<AliasConfig> {
    vec![
        AliasConfig {
            alias: "عربي".into(),
            task_type: "arabic".into(),
        },
        AliasConfig {
            alias: "default".into(),
            task_type: "general".into(),
        },
    ]
}

// ── serde default helpers ───────────────────────────────────────────

fn d_api_key_env() -> String {
    "HUGGINGFACE_API_KEY".into()
}
fn d_default_task_type() -> String {
    "general".into()
}
fn d_endpoint() -> String {
    "https://router.huggingface.co/v1".into()
}
fn d_60000() -> u64 {
    60_000
}
fn d_temperature() -> f32 {
    0.7
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
