//! Publisher-specific enrichment data
//!
//! A validation carries a side-channel of key/value data for publishers
//! (recipient lists, templates, routing keys). Data is namespaced by the
//! publisher's stable namespace string so checks never need to know about
//! concrete publisher types.
//!
//! Rules:
//! - a namespace may be written at most once per validation
//! - non-forced writes place each key in the global namespace unless the
//!   global namespace already holds that key (first writer wins), in which
//!   case the key stays private to the writing namespace
//! - forced writes never touch the global namespace

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::EnrichmentFailure;

/// Name of the reserved namespace visible to every publisher
pub const GLOBAL_NAMESPACE: &str = "GLOBAL";

/// Key/value data attached for one namespace
pub type EnrichmentValues = Map<String, Value>;

/// Namespaced enrichment map of a single validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    global: EnrichmentValues,
    namespaces: BTreeMap<String, EnrichmentValues>,
}

impl Enrichment {
    /// Create an empty enrichment map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `values` for `namespace`
    ///
    /// `owner` is the validation name, used only for error reporting.
    pub fn enrich(
        &mut self,
        owner: &str,
        namespace: &str,
        values: EnrichmentValues,
        force_namespace: bool,
    ) -> Result<(), EnrichmentFailure> {
        if self.namespaces.contains_key(namespace) {
            return Err(EnrichmentFailure {
                namespace: namespace.to_string(),
                validation: owner.to_string(),
                present: self.namespaces.keys().cloned().collect(),
            });
        }

        let mut private = EnrichmentValues::new();
        for (key, value) in values {
            if force_namespace || self.global.contains_key(&key) {
                private.insert(key, value);
            } else {
                self.global.insert(key, value);
            }
        }
        self.namespaces.insert(namespace.to_string(), private);
        Ok(())
    }

    /// Data visible to `namespace`
    ///
    /// Global data merged with the namespace's private data (private wins on
    /// collision), or only the private data when `force_namespace` is set.
    #[must_use]
    pub fn get(&self, namespace: &str, force_namespace: bool) -> EnrichmentValues {
        let mut data = if force_namespace {
            EnrichmentValues::new()
        } else {
            self.global.clone()
        };
        if let Some(private) = self.namespaces.get(namespace) {
            for (key, value) in private {
                data.insert(key.clone(), value.clone());
            }
        }
        data
    }

    /// Whether `namespace` has been written
    #[must_use]
    pub fn is_enriched_for(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// The global namespace's data
    #[must_use]
    pub const fn global(&self) -> &EnrichmentValues {
        &self.global
    }

    /// Whether nothing has been written at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
