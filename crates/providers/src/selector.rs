//! Task-type → model resolution.

use crate::aliases::TaskAliasMap;
use crate::catalog::{ModelCatalog, ModelDescriptor};
use std::sync::Arc;
use vc_domain::config::ModelsConfig;
use vc_domain::error::{Error, Result};
use vc_domain::trace::TraceEvent;

/// Resolves a requested task type to a catalog entry.
///
/// Lookup order: exact catalog key, then alias, then the catalog's default
/// task type. Matching is case-sensitive after trimming whitespace.
pub struct ModelSelector {
    catalog: Arc<ModelCatalog>,
    aliases: TaskAliasMap,
}

impl ModelSelector {
    /// Every alias must point at a catalog entry.
    pub fn new(catalog: Arc<ModelCatalog>, aliases: TaskAliasMap) -> Result<Self> {
        for canonical in aliases.canonicals() {
            if !catalog.contains(canonical) {
                return Err(Error::Config(format!(
                    "alias target \"{canonical}\" is not in the catalog"
                )));
            }
        }

        TraceEvent::CatalogLoaded {
            entries: catalog.len(),
            aliases: aliases.len(),
            default_task_type: catalog.default_task_type().to_string(),
        }
        .emit();

        Ok(Self { catalog, aliases })
    }

    pub fn from_config(config: &ModelsConfig) -> Result<Self> {
        let catalog = Arc::new(ModelCatalog::from_config(config)?);
        let aliases = TaskAliasMap::from_config(&config.alias_entries())?;
        Self::new(catalog, aliases)
    }

    pub fn catalog(&self) -> &Arc<ModelCatalog> {
        &self.catalog
    }

    pub fn aliases(&self) -> &TaskAliasMap {
        &self.aliases
    }

    /// Resolve `requested` to a descriptor, falling back to the default.
    ///
    /// Fails only when the default task type itself is absent.
    pub fn select(&self, requested: &str) -> Result<Arc<ModelDescriptor>> {
        let (task_type, fallback) = self.resolve_task_type(requested);
        let descriptor = self.catalog.lookup(task_type)?;

        if fallback {
            tracing::debug!(
                requested = %requested,
                default = %task_type,
                "unknown task type, using default model"
            );
        }
        TraceEvent::ModelSelected {
            requested: requested.to_string(),
            task_type: descriptor.task_type.clone(),
            model_id: descriptor.model_id.clone(),
            fallback,
        }
        .emit();

        Ok(descriptor)
    }

    /// The model key [`select`](Self::select) would use for `task_type`.
    pub fn recommended_model(&self, task_type: &str) -> Result<String> {
        let (resolved, _) = self.resolve_task_type(task_type);
        Ok(self.catalog.lookup(resolved)?.model_key.clone())
    }

    fn resolve_task_type<'a>(&'a self, requested: &'a str) -> (&'a str, bool) {
        let key = requested.trim();
        if self.catalog.contains(key) {
            return (key, false);
        }
        if let Some(canonical) = self.aliases.resolve(key) {
            return (canonical, false);
        }
        (self.catalog.default_task_type(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin() -> ModelSelector {
        ModelSelector::from_config(&ModelsConfig::default()).unwrap()
    }

    #[test]
    fn every_catalog_task_type_selects_itself() {
        let selector = builtin();
        let types: Vec<String> = selector.catalog().list_available().into_keys().collect();
        for t in types {
            assert_eq!(selector.select(&t).unwrap().task_type, t);
        }
    }

    #[test]
    fn unknown_falls_back_to_general() {
        let selector = builtin();
        assert_eq!(selector.select("poetry").unwrap().task_type, "general");
        assert_eq!(selector.select("").unwrap().task_type, "general");
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(builtin().select("  code \n").unwrap().task_type, "code");
    }

    #[test]
    fn arabic_alias_resolves() {
        let selector = builtin();
        assert_eq!(selector.select("عربي").unwrap().task_type, "arabic");
        assert_eq!(selector.select("default").unwrap().task_type, "general");
    }

    #[test]
    fn case_mismatch_falls_back() {
        assert_eq!(builtin().select("CODE").unwrap().task_type, "general");
    }

    #[test]
    fn recommended_model_keys() {
        let selector = builtin();
        assert_eq!(selector.recommended_model("chat").unwrap(), "llama-2-7b");
        assert_eq!(selector.recommended_model("code").unwrap(), "codellama-7b");
        assert_eq!(selector.recommended_model("عربي").unwrap(), "jais-13b");
        assert_eq!(selector.recommended_model("anything").unwrap(), "mistral-7b");
    }

    #[test]
    fn alias_to_missing_entry_fails_construction() {
        let catalog = Arc::new(ModelCatalog::from_config(&ModelsConfig::default()).unwrap());
        let aliases = TaskAliasMap::from_pairs(&[("poetry", "poems")]).unwrap();
        assert!(matches!(
            ModelSelector::new(catalog, aliases),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_default_is_unknown_task_type() {
        let mut cfg = ModelsConfig::default();
        cfg.default_task_type = "missing".into();
        let selector = ModelSelector::from_config(&cfg).unwrap();
        assert_eq!(selector.select("code").unwrap().task_type, "code");
        assert!(matches!(
            selector.select("unknown"),
            Err(Error::UnknownTaskType(t)) if t == "missing"
        ));
    }
}
