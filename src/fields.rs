//! Per-category field extraction.
//!
//! One remote round-trip per category, with an explicit outcome so
//! "no data", "parse failure", and "success" stay distinguishable.

use crate::client::{strip_json_fences, ChatCompletion};
use crate::error::Error;
use crate::prompt::{Category, PromptLibrary};
use serde_json::Value;
use tracing::warn;

/// Result of a single category extraction.
#[derive(Debug, Clone)]
pub enum CategoryOutcome {
    /// The model returned a usable payload for this category.
    Extracted(Value),
    /// No data was available: the remote call failed, the response was
    /// blank, or the expected key was missing.
    Empty,
    /// The response could not be interpreted (unparseable JSON).
    Failed(Error),
}

impl CategoryOutcome {
    /// Returns true if a payload was extracted.
    #[must_use]
    pub const fn is_extracted(&self) -> bool {
        matches!(self, Self::Extracted(_))
    }

    /// Returns true if no data was available.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true if the response failed to parse.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runs category extractions against a completion client.
pub struct FieldExtractor<'a> {
    client: &'a dyn ChatCompletion,
    prompts: &'a PromptLibrary,
    model: &'a str,
}

impl<'a> FieldExtractor<'a> {
    /// Creates a field extractor bound to a client, prompt library, and
    /// model identifier.
    #[must_use]
    pub fn new(
        client: &'a dyn ChatCompletion,
        prompts: &'a PromptLibrary,
        model: &'a str,
    ) -> Self {
        Self {
            client,
            prompts,
            model,
        }
    }

    /// Runs one category extraction.
    ///
    /// Transport and API errors are reported and absorbed into
    /// [`CategoryOutcome::Empty`]; a response that is not valid JSON yields
    /// [`CategoryOutcome::Failed`]. This never returns an error: callers
    /// decide how much a degraded category matters.
    pub fn extract(&self, category: Category, text: &str) -> CategoryOutcome {
        let prompt = match self.prompts.render(category, text) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Failed to render {category} prompt: {e}");
                return CategoryOutcome::Failed(e);
            }
        };

        let raw = match self.client.complete(self.model, &prompt) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Completion request for {category} failed: {e}");
                return CategoryOutcome::Empty;
            }
        };

        let body = strip_json_fences(&raw);
        if body.trim().is_empty() {
            warn!("Completion for {category} was empty");
            return CategoryOutcome::Empty;
        }

        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                let err = Error::parse(category.id(), e.to_string());
                warn!("{err}");
                return CategoryOutcome::Failed(err);
            }
        };

        match category.key() {
            // basic_info: store the parsed object whole
            None => CategoryOutcome::Extracted(value),
            Some(key) => match value.get(key) {
                Some(Value::Array(items)) => {
                    CategoryOutcome::Extracted(Value::Array(items.clone()))
                }
                Some(Value::Null) | None => {
                    warn!("Completion for {category} lacks the '{key}' key");
                    CategoryOutcome::Empty
                }
                Some(other) => {
                    warn!(
                        "Completion for {category} has a non-array '{key}' value: {other}"
                    );
                    CategoryOutcome::Empty
                }
            },
        }
    }
}
