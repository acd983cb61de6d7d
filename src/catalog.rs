use std::collections::BTreeSet;

use tracing::{error, info};

use crate::backend::GenerativeBackend;

/// Version tokens dropped from an alias before fuzzy matching. Order matters:
/// "3.0-" has to go before "3-".
const ALIAS_STRIP_TOKENS: &[&str] = &["gemini-", "1.5-", "2.5-", "3.0-", "3-"];

/// Model identifiers the Gemini account can use, loaded once at startup.
#[derive(Debug, Default, Clone)]
pub struct ModelCatalog {
    models: BTreeSet<String>,
}

impl ModelCatalog {
    pub fn new<I, S>(models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
        }
    }

    /// Fetch the catalog from the backend. Failures are logged and leave the
    /// catalog empty.
    pub async fn load(backend: &dyn GenerativeBackend) -> Self {
        match backend.list_models().await {
            Ok(names) => {
                let catalog = Self::new(names.iter().map(|n| strip_model_prefix(n)));
                info!(
                    backend = backend.name(),
                    count = catalog.len(),
                    models = ?catalog.models,
                    "loaded model catalog"
                );
                catalog
            }
            Err(e) => {
                error!(backend = backend.name(), error = %e, "failed to load model catalog");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains(model)
    }

    /// Map a user-facing alias onto a concrete catalog identifier.
    ///
    /// Exact members are returned as-is. Otherwise the alias is reduced to a
    /// keyword (lower-cased, provider and version tokens stripped) and the
    /// lexicographically greatest non-vision model containing it wins, so
    /// "gemini-flash" picks "gemini-2.5-flash" over "gemini-1.5-flash".
    /// Anything unresolvable passes through untouched.
    pub fn resolve(&self, alias: &str) -> String {
        if self.is_empty() || self.contains(alias) {
            return alias.to_string();
        }

        let keyword = search_keyword(alias);

        // BTreeSet iterates in order, so the last match is the greatest.
        self.models
            .iter()
            .filter(|m| {
                let lower = m.to_lowercase();
                lower.contains(&keyword) && !lower.contains("vision")
            })
            .next_back()
            .cloned()
            .unwrap_or_else(|| alias.to_string())
    }
}

fn search_keyword(alias: &str) -> String {
    ALIAS_STRIP_TOKENS
        .iter()
        .fold(alias.to_lowercase(), |acc, token| acc.replace(token, ""))
}

/// Gemini reports names as "models/gemini-2.5-flash".
pub fn strip_model_prefix(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}
