//! Task-type alias map.
//!
//! Lets a request name a task type by another surface string, e.g. the
//! Arabic word for "Arabic" resolving to `arabic`. Many aliases may point at
//! one canonical task type; one alias may never point at two.

use std::collections::HashMap;
use vc_domain::config::AliasConfig;
use vc_domain::error::{Error, Result};

pub struct TaskAliasMap {
    /// canonical → [aliases]
    to_aliases: HashMap<String, Vec<String>>,
    /// alias → canonical
    to_canonical: HashMap<String, String>,
}

impl TaskAliasMap {
    /// Create a new alias map from pairs of `(canonical, alias)`.
    ///
    /// Repeating an identical pair is harmless; mapping one alias to two
    /// canonicals fails.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self> {
        let mut to_aliases: HashMap<String, Vec<String>> = HashMap::new();
        let mut to_canonical: HashMap<String, String> = HashMap::new();

        for (canonical, alias) in pairs {
            match to_canonical.get(*alias) {
                Some(existing) if existing == canonical => continue,
                Some(existing) => {
                    return Err(Error::Config(format!(
                        "alias \"{alias}\" maps to both \"{existing}\" and \"{canonical}\""
                    )));
                }
                None => {}
            }
            to_aliases
                .entry(canonical.to_string())
                .or_default()
                .push(alias.to_string());
            to_canonical.insert(alias.to_string(), canonical.to_string());
        }

        Ok(Self {
            to_aliases,
            to_canonical,
        })
    }

    pub fn from_config(aliases: &[AliasConfig]) -> Result<Self> {
        let pairs: Vec<(&str, &str)> = aliases
            .iter()
            .map(|a| (a.task_type.as_str(), a.alias.as_str()))
            .collect();
        Self::from_pairs(&pairs)
    }

    /// Resolve an alias to its canonical task type.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.to_canonical.get(alias).map(|s| s.as_str())
    }

    /// Get all known aliases for a canonical task type.
    pub fn aliases_for(&self, canonical: &str) -> &[String] {
        self.to_aliases
            .get(canonical)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// List all canonical task types referenced by some alias.
    pub fn canonicals(&self) -> Vec<&str> {
        self.to_aliases.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_canonical.is_empty()
    }
}
