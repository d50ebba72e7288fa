//! Two-pass extraction pipeline.
//!
//! Per category: a raw pass quotes the document, a precise pass normalizes
//! the quotes to JSON. Both outputs are persisted, and a manifest recording
//! every output key is written last so the transform step can find them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use llm_client::{extract_json_object, ChatModel};

use crate::error::{CoiError, Result};
use crate::fields::Category;
use crate::store::DocumentStore;
use crate::templates::templates;

/// Output keys for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryOutput {
    pub raw_output_key: String,
    pub precise_output_key: String,
}

/// Record of one extraction run: where every output landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionManifest {
    pub model_id: String,
    pub document_key: String,
    pub preferred_share_names: Vec<String>,
    pub categories: IndexMap<String, CategoryOutput>,
}

impl ExtractionManifest {
    /// Look up a category's outputs.
    pub fn category(&self, category: Category) -> Result<&CategoryOutput> {
        self.categories
            .get(category.label())
            .ok_or_else(|| CoiError::CategoryParse {
                category: category.label().to_string(),
                reason: "missing from manifest".to_string(),
            })
    }
}

/// The extraction pipeline: one model, one store.
pub struct CoiExtractor<'a> {
    model: &'a dyn ChatModel,
    store: &'a dyn DocumentStore,
    output_prefix: String,
}

impl<'a> CoiExtractor<'a> {
    /// Create an extractor writing under `outputs/`.
    pub fn new(model: &'a dyn ChatModel, store: &'a dyn DocumentStore) -> Self {
        Self {
            model,
            store,
            output_prefix: "outputs".to_string(),
        }
    }

    /// Override the output key prefix.
    pub fn with_output_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output_prefix = prefix.into();
        self
    }

    /// Run every category over the document at `document_key` and persist the
    /// manifest. The document's file stem becomes part of every output key.
    pub async fn run_extraction(&self, document_key: &str) -> Result<ExtractionManifest> {
        let document = self.store.get_required(document_key).await?;
        let stem = document_stem(document_key);
        let model_id = self.model.model_handle().to_string();

        info!(document = %stem, model = %model_id, "starting COI extraction");

        let mut manifest = ExtractionManifest {
            model_id: model_id.clone(),
            document_key: document_key.to_string(),
            preferred_share_names: Vec::new(),
            categories: IndexMap::new(),
        };

        let mut share_names_line: Option<String> = None;

        for category in Category::ALL {
            let share_names = if category.wants_share_names() {
                share_names_line.as_deref()
            } else {
                None
            };

            let output = self
                .run_category(category, &document, &stem, &model_id, share_names)
                .await?;

            // The first category discovers the series every later category
            // is prompted with and the transform aligns against.
            if category == Category::PreferredShareNames {
                let precise = self.store.get_required(&output.precise_output_key).await?;
                let names = parse_share_names(&precise)?;
                info!(count = names.len(), "preferred share names extracted");
                share_names_line = Some(names.join(", "));
                manifest.preferred_share_names = names;
            }

            manifest
                .categories
                .insert(category.label().to_string(), output);
        }

        let manifest_key = format!(
            "{}/config_json/{}/{}/config.json",
            self.output_prefix, stem, model_id
        );
        self.store
            .put(&manifest_key, &serde_json::to_string_pretty(&manifest)?)
            .await?;

        Ok(manifest)
    }

    async fn run_category(
        &self,
        category: Category,
        document: &str,
        stem: &str,
        model_id: &str,
        share_names: Option<&str>,
    ) -> Result<CategoryOutput> {
        let prompts = templates(category);
        let label = category.label();

        let raw_response = self
            .model
            .complete(&prompts.render_raw(document, share_names))
            .await?;
        let raw_output_key = format!(
            "{}/data_extracts/{}/{}/{}_raw_extract/data.txt",
            self.output_prefix, stem, model_id, label
        );
        self.store.put(&raw_output_key, &raw_response).await?;

        let precise_response = self
            .model
            .complete(&prompts.render_precise(&raw_response, share_names))
            .await?;
        let precise_output_key = format!(
            "{}/data_extracts/{}/{}/{}_precise_extract/data.txt",
            self.output_prefix, stem, model_id, label
        );
        self.store.put(&precise_output_key, &precise_response).await?;

        info!(category = label, "category extracted");

        Ok(CategoryOutput {
            raw_output_key,
            precise_output_key,
        })
    }
}

/// Parse the share-name list out of the first category's precise output.
fn parse_share_names(precise_output: &str) -> Result<Vec<String>> {
    let value = extract_json_object(precise_output).map_err(|e| CoiError::CategoryParse {
        category: Category::PreferredShareNames.label().to_string(),
        reason: e.to_string(),
    })?;

    let names: Vec<String> = value
        .get("preferred_share_names")
        .and_then(|v| v.as_array())
        .map(|names| {
            names
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        warn!("share-name pass produced an empty list");
        return Err(CoiError::NoShareNames);
    }
    Ok(names)
}

/// Strip directories and the `.txt` extension from a document key.
fn document_stem(key: &str) -> String {
    let name = key.rsplit('/').next().unwrap_or(key);
    name.strip_suffix(".txt").unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_stem() {
        assert_eq!(document_stem("inbox/acme 2024-10-28 COI.txt"), "acme 2024-10-28 COI");
        assert_eq!(document_stem("plain.txt"), "plain");
        assert_eq!(document_stem("no-extension"), "no-extension");
    }

    #[test]
    fn test_parse_share_names() {
        let output = r#"```json
{"preferred_share_names": ["Series A", "Series B-1", "Seed Preferred Stock"]}
```"#;
        let names = parse_share_names(output).unwrap();
        assert_eq!(names, vec!["Series A", "Series B-1", "Seed Preferred Stock"]);
    }

    #[test]
    fn test_parse_share_names_empty_is_error() {
        let err = parse_share_names(r#"{"preferred_share_names": []}"#).unwrap_err();
        assert!(matches!(err, CoiError::NoShareNames));
    }
}
