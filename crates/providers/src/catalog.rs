//! Model catalog.
//!
//! Static mapping from task type to the model that serves it. Built once at
//! startup from [`ModelsConfig`] and shared read-only afterwards.

use crate::traits::ApiKey;
use crate::util::resolve_api_key;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use vc_domain::config::{CatalogEntryConfig, ModelsConfig};
use vc_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Descriptor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything needed to call the model behind one task type.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDescriptor {
    pub task_type: String,
    pub model_key: String,
    pub model_id: String,
    pub display_name: String,
    pub endpoint: String,
    pub temperature: f32,
    pub description: String,
    pub size: String,
    pub strengths: Vec<String>,
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

impl ModelDescriptor {
    fn from_entry(entry: &CatalogEntryConfig, default_endpoint: &str, api_key: Option<ApiKey>) -> Self {
        Self {
            task_type: entry.task_type.clone(),
            model_key: entry.model_key.clone(),
            model_id: entry.model_id.clone(),
            display_name: entry.display_name.clone(),
            endpoint: entry
                .endpoint
                .clone()
                .unwrap_or_else(|| default_endpoint.to_string()),
            temperature: entry.temperature,
            description: entry.description.clone(),
            size: entry.size.clone(),
            strengths: entry.strengths.clone(),
            api_key,
        }
    }
}

/// Metadata shown for coding-oriented catalog entries.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CodingModelInfo {
    pub model_key: String,
    pub description: String,
    pub size: String,
    pub strengths: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ModelCatalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct ModelCatalog {
    entries: BTreeMap<String, Arc<ModelDescriptor>>,
    default_task_type: String,
}

impl ModelCatalog {
    /// Build the catalog from descriptors. Duplicate task types are a
    /// configuration error.
    pub fn new(descriptors: Vec<ModelDescriptor>, default_task_type: impl Into<String>) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for d in descriptors {
            let task_type = d.task_type.clone();
            if entries.insert(task_type.clone(), Arc::new(d)).is_some() {
                return Err(Error::Config(format!(
                    "duplicate catalog task type \"{task_type}\""
                )));
            }
        }
        Ok(Self {
            entries,
            default_task_type: default_task_type.into(),
        })
    }

    /// Build the catalog from the `[models]` config section.
    ///
    /// The API key is read from the environment once here and shared by
    /// every descriptor.
    pub fn from_config(config: &ModelsConfig) -> Result<Self> {
        let api_key = resolve_api_key(&config.api_key_env);
        let descriptors = config
            .catalog_entries()
            .iter()
            .map(|e| ModelDescriptor::from_entry(e, &config.default_endpoint, api_key.clone()))
            .collect();
        Self::new(descriptors, config.default_task_type.clone())
    }

    /// `task_type -> display_name` for every entry.
    pub fn list_available(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(k, d)| (k.clone(), d.display_name.clone()))
            .collect()
    }

    pub fn lookup(&self, task_type: &str) -> Result<Arc<ModelDescriptor>> {
        self.entries
            .get(task_type)
            .cloned()
            .ok_or_else(|| Error::UnknownTaskType(task_type.to_string()))
    }

    pub fn contains(&self, task_type: &str) -> bool {
        self.entries.contains_key(task_type)
    }

    /// Metadata for every `code*` entry.
    pub fn coding_models(&self) -> BTreeMap<String, CodingModelInfo> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with("code"))
            .map(|(k, d)| {
                (
                    k.clone(),
                    CodingModelInfo {
                        model_key: d.model_key.clone(),
                        description: d.description.clone(),
                        size: d.size.clone(),
                        strengths: d.strengths.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn default_task_type(&self) -> &str {
        &self.default_task_type
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.entries.values()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
